//! Exercise generation: topic -> random question with its canonical answer.
//!
//! Randomness comes exclusively from the injected `RandomSource`, candidate
//! tables from `ExercisePools`. Given the same script and pools the output is
//! identical except for the exercise id.

use uuid::Uuid;

use crate::config::ExercisePools;
use crate::domain::{Exercise, Topic};
use crate::kernel::{digit_sum, digit_sum_divisible_by_3, digits, is_prime, prime_factors, smallest_factor};
use crate::random::{pick, RandomSource};
use crate::util::{join_digits, join_factors, join_factors_spaced};

const YES: &str = "yes";
const NO: &str = "no";

fn yes_no(b: bool) -> String {
  if b { YES.into() } else { NO.into() }
}

/// Generate one exercise. With `topic == None` the topic is drawn uniformly from all five.
pub fn generate(rng: &mut dyn RandomSource, pools: &ExercisePools, topic: Option<Topic>) -> Exercise {
  let topic = match topic {
    Some(t) => t,
    None => pick(rng, &Topic::ALL, Topic::Divisibility),
  };
  match topic {
    Topic::Divisibility => divisibility(rng, pools),
    Topic::Primality => primality(rng, pools),
    Topic::Factorization => factorization(rng, pools),
    Topic::Exponentiation => exponentiation(rng, pools),
    Topic::Remainder => remainder(rng, pools),
  }
}

fn new_exercise(topic: Topic, prompt: String, answer: String, explanation: String, subject_value: i64) -> Exercise {
  Exercise {
    id: Uuid::new_v4().to_string(),
    topic,
    prompt,
    answer,
    explanation,
    subject_value,
    expected_factors: Vec::new(),
  }
}

fn divisibility(rng: &mut dyn RandomSource, pools: &ExercisePools) -> Exercise {
  let n = rng.int_in_range(pools.divisibility_min, pools.divisibility_max);
  let d = pick(rng, &pools.divisors, 2);
  let divisible = n % d == 0;
  let verdict = if divisible { "is" } else { "is not" };
  let last = digits(n).last().copied().unwrap_or(0);

  let explanation = match d {
    3 => {
      let sum = digit_sum(n);
      let sum_verdict = if digit_sum_divisible_by_3(n) { "is" } else { "is not" };
      format!(
        "Digit sum of {n}: {}={sum}. {sum} {sum_verdict} divisible by 3, so {n} {verdict} divisible by 3.",
        join_digits(&digits(n))
      )
    }
    2 => format!(
      "A number is divisible by 2 when its last digit is 0, 2, 4, 6 or 8. The last digit of {n} is {last}, so {n} {verdict} divisible by 2."
    ),
    5 => format!(
      "A number is divisible by 5 when its last digit is 0 or 5. The last digit of {n} is {last}, so {n} {verdict} divisible by 5."
    ),
    10 => format!(
      "A number is divisible by 10 when its last digit is 0. The last digit of {n} is {last}, so {n} {verdict} divisible by 10."
    ),
    _ => format!(
      "{n} = {d} × {} + {}. A number is divisible by {d} when the remainder is 0, so {n} {verdict} divisible by {d}.",
      n.div_euclid(d),
      n.rem_euclid(d)
    ),
  };

  new_exercise(
    Topic::Divisibility,
    format!("Is {n} divisible by {d}? Answer yes or no."),
    yes_no(divisible),
    explanation,
    n,
  )
}

fn primality(rng: &mut dyn RandomSource, pools: &ExercisePools) -> Exercise {
  let n = pick(rng, &pools.primality_candidates, 11);
  let prime = is_prime(n);
  let explanation = if prime {
    format!("{n} is prime: it has exactly two divisors, 1 and {n}.")
  } else {
    match smallest_factor(n) {
      Some(f) => format!("{n} is not prime: it is divisible by {f} ({n} = {f} × {}).", n / f),
      None => format!("{n} is not prime: a prime is a whole number greater than 1 with exactly two divisors."),
    }
  };

  new_exercise(
    Topic::Primality,
    format!("Is {n} a prime number? Answer yes or no."),
    yes_no(prime),
    explanation,
    n,
  )
}

fn factorization(rng: &mut dyn RandomSource, pools: &ExercisePools) -> Exercise {
  let n = pick(rng, &pools.factorization_subjects, 12);
  let factors = prime_factors(n);
  let mut ex = new_exercise(
    Topic::Factorization,
    format!("Write {n} as a product of prime factors (e.g. 2×3×5)."),
    join_factors(&factors),
    format!("{n} = {}", join_factors_spaced(&factors)),
    n,
  );
  ex.expected_factors = factors;
  ex
}

fn exponentiation(rng: &mut dyn RandomSource, pools: &ExercisePools) -> Exercise {
  let base = pick(rng, &pools.exponent_bases, 2);
  let exp = pick(rng, &pools.exponents, 2);
  // Pools are sanitized so the power fits; fall back to squaring otherwise.
  let (exp, value) = match base.checked_pow(exp) {
    Some(v) => (exp, v),
    None => (2, base.saturating_mul(base)),
  };
  let repeated = join_factors_spaced(&vec![base; exp as usize]);

  new_exercise(
    Topic::Exponentiation,
    format!("What is {base}^{exp}?"),
    value.to_string(),
    format!("{base}^{exp} means {base} multiplied by itself {exp} times: {repeated} = {value}."),
    base,
  )
}

fn remainder(rng: &mut dyn RandomSource, pools: &ExercisePools) -> Exercise {
  let a = rng.int_in_range(pools.dividend_min, pools.dividend_max);
  let b = rng.int_in_range(pools.divisor_min, pools.divisor_max).max(1);
  let q = a.div_euclid(b);
  let r = a.rem_euclid(b);

  new_exercise(
    Topic::Remainder,
    format!("What is the remainder when {a} is divided by {b}?"),
    r.to_string(),
    format!("{a} = {b} × {q} + {r}, so the remainder is {r}."),
    a,
  )
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::random::{ScriptedRandom, SeededRandom};

  fn pools() -> ExercisePools {
    ExercisePools::default()
  }

  #[test]
  fn exponentiation_with_forced_inputs() {
    // base index 0 -> 2, exponent index 1 -> 3
    let mut rng = ScriptedRandom::new([0, 1]);
    let ex = generate(&mut rng, &pools(), Some(Topic::Exponentiation));
    assert_eq!(ex.answer, "8");
    assert_eq!(ex.prompt, "What is 2^3?");
    assert!(ex.explanation.contains("2 × 2 × 2 = 8"), "{}", ex.explanation);
  }

  #[test]
  fn divisibility_by_three_cites_digit_sum() {
    // n = 15, divisor index 1 -> 3
    let mut rng = ScriptedRandom::new([15, 1]);
    let ex = generate(&mut rng, &pools(), Some(Topic::Divisibility));
    assert_eq!(ex.answer, "yes");
    assert_eq!(ex.subject_value, 15);
    assert!(ex.explanation.contains("1+5=6"), "{}", ex.explanation);
  }

  #[test]
  fn divisibility_other_rules_name_the_last_digit() {
    let mut rng = ScriptedRandom::new([47, 2]);
    let ex = generate(&mut rng, &pools(), Some(Topic::Divisibility));
    assert_eq!(ex.prompt, "Is 47 divisible by 5? Answer yes or no.");
    assert_eq!(ex.answer, "no");
    assert!(ex.explanation.contains("last digit of 47 is 7"));
  }

  #[test]
  fn primality_explanations() {
    let p = pools();
    let idx_13 = p.primality_candidates.iter().position(|&n| n == 13).unwrap() as i64;
    let idx_21 = p.primality_candidates.iter().position(|&n| n == 21).unwrap() as i64;

    let mut rng = ScriptedRandom::new([idx_13, idx_21]);
    let prime = generate(&mut rng, &p, Some(Topic::Primality));
    assert_eq!(prime.answer, "yes");
    assert!(prime.explanation.contains("exactly two divisors"));

    let composite = generate(&mut rng, &p, Some(Topic::Primality));
    assert_eq!(composite.answer, "no");
    assert!(composite.explanation.contains("divisible by 3"), "{}", composite.explanation);
  }

  #[test]
  fn factorization_carries_expected_factors() {
    // index 0 -> 12
    let mut rng = ScriptedRandom::new([0]);
    let ex = generate(&mut rng, &pools(), Some(Topic::Factorization));
    assert_eq!(ex.subject_value, 12);
    assert_eq!(ex.expected_factors, vec![2, 2, 3]);
    assert_eq!(ex.answer, "2×2×3");
    assert_eq!(ex.explanation, "12 = 2 × 2 × 3");
  }

  #[test]
  fn remainder_states_the_identity() {
    let mut rng = ScriptedRandom::new([47, 5]);
    let ex = generate(&mut rng, &pools(), Some(Topic::Remainder));
    assert_eq!(ex.answer, "2");
    assert!(ex.explanation.contains("47 = 5 × 9 + 2"));
  }

  #[test]
  fn omitted_topic_is_drawn_from_the_source() {
    // topic index 2 -> factorization, then subject index 7 -> 60
    let mut rng = ScriptedRandom::new([2, 7]);
    let ex = generate(&mut rng, &pools(), None);
    assert_eq!(ex.topic, Topic::Factorization);
    assert_eq!(ex.subject_value, 60);
  }

  #[test]
  fn random_generation_stays_inside_the_pools() {
    let p = pools();
    let mut rng = SeededRandom::new(Some(2024));
    for _ in 0..500 {
      let ex = generate(&mut rng, &p, None);
      match ex.topic {
        Topic::Divisibility => {
          assert!((10..=199).contains(&ex.subject_value));
          assert!(ex.answer == "yes" || ex.answer == "no");
        }
        Topic::Primality => {
          assert!(p.primality_candidates.contains(&ex.subject_value));
          assert_eq!(ex.answer == "yes", is_prime(ex.subject_value));
        }
        Topic::Factorization => {
          assert!(p.factorization_subjects.contains(&ex.subject_value));
          assert_eq!(ex.expected_factors.iter().product::<i64>(), ex.subject_value);
        }
        Topic::Exponentiation => {
          assert!(p.exponent_bases.contains(&ex.subject_value));
          assert!(ex.answer.parse::<i64>().is_ok());
        }
        Topic::Remainder => {
          assert!((10..=99).contains(&ex.subject_value));
          let r: i64 = ex.answer.parse().unwrap();
          assert!((0..11).contains(&r));
        }
      }
    }
  }
}

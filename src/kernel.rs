//! Arithmetic kernel: primality, factorization, divisibility rules, and
//! free-text factor parsing.
//!
//! Everything here is pure and infallible. Out-of-domain inputs (negative
//! numbers, 0, 1) produce "not applicable" values (`false`, `None`, empty
//! vectors) and callers decide how to present them.

use serde::Serialize;

/// Upper bound accepted by [`primes_up_to`]; larger limits are clamped.
pub const PRIMES_LIMIT_MAX: i64 = 10_000;

/// Largest `|n|` the HTTP kernel endpoints accept; trial division stays
/// under a million steps.
pub const KERNEL_N_MAX: i64 = 1_000_000_000_000;

/// Primality by trial division over odd candidates up to `sqrt(n)`.
pub fn is_prime(n: i64) -> bool {
  if n < 2 {
    return false;
  }
  if n == 2 {
    return true;
  }
  if n % 2 == 0 {
    return false;
  }
  let mut d = 3;
  // `d <= n / d` is `d * d <= n` without overflow.
  while d <= n / d {
    if n % d == 0 {
      return false;
    }
    d += 2;
  }
  true
}

/// Least divisor > 1 of a composite `n`. `None` for primes and for `n < 2`.
pub fn smallest_factor(n: i64) -> Option<i64> {
  if n < 2 {
    return None;
  }
  if n % 2 == 0 {
    // 2 itself is prime and has no proper smallest factor.
    return if n == 2 { None } else { Some(2) };
  }
  let mut d = 3;
  while d <= n / d {
    if n % d == 0 {
      return Some(d);
    }
    d += 2;
  }
  None
}

/// Prime factors with multiplicity, ascending (`12 -> [2, 2, 3]`).
/// Empty for `n < 2`.
pub fn prime_factors(n: i64) -> Vec<i64> {
  let mut out = Vec::new();
  if n < 2 {
    return out;
  }
  let mut rest = n;
  while rest % 2 == 0 {
    out.push(2);
    rest /= 2;
  }
  let mut d = 3;
  while d <= rest / d {
    while rest % d == 0 {
      out.push(d);
      rest /= d;
    }
    d += 2;
  }
  if rest > 1 {
    out.push(rest);
  }
  out
}

/// Decimal digits of `|n|`, most significant first.
pub fn digits(n: i64) -> Vec<u32> {
  n.unsigned_abs()
    .to_string()
    .chars()
    .filter_map(|c| c.to_digit(10))
    .collect()
}

pub fn digit_sum(n: i64) -> u32 {
  digits(n).iter().sum()
}

/// Divisibility by 3 via the digit-sum rule.
pub fn digit_sum_divisible_by_3(n: i64) -> bool {
  digit_sum(n) % 3 == 0
}

/// Everything the divisibility widget shows for one number.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DivisibilityReport {
  pub n: i64,
  pub digits: Vec<u32>,
  pub digit_sum: u32,
  pub last_digit: u32,
  pub by2: bool,
  pub by3: bool,
  pub by5: bool,
  pub by6: bool,
  pub by10: bool,
}

pub fn divisibility_report(n: i64) -> DivisibilityReport {
  let digits = digits(n);
  let digit_sum = digits.iter().sum();
  let by2 = n % 2 == 0;
  let by3 = digit_sum_divisible_by_3(n);
  DivisibilityReport {
    n,
    last_digit: digits.last().copied().unwrap_or(0),
    digit_sum,
    digits,
    by2,
    by3,
    by5: n % 5 == 0,
    by6: by2 && by3,
    by10: n % 10 == 0,
  }
}

/// One rung of the division ladder: `value / prime = quotient`.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FactorStep {
  pub value: i64,
  pub prime: i64,
  pub quotient: i64,
}

/// Division ladder used by the factorization animation (`60 -> 30 -> 15 -> 5 -> 1`).
pub fn factorization_steps(n: i64) -> Vec<FactorStep> {
  let mut value = n;
  prime_factors(n)
    .into_iter()
    .map(|prime| {
      let step = FactorStep { value, prime, quotient: value / prime };
      value = step.quotient;
      step
    })
    .collect()
}

/// Sieve of Eratosthenes. `limit` is clamped to [`PRIMES_LIMIT_MAX`].
pub fn primes_up_to(limit: i64) -> Vec<i64> {
  let limit = limit.min(PRIMES_LIMIT_MAX);
  if limit < 2 {
    return Vec::new();
  }
  let size = limit as usize + 1;
  let mut composite = vec![false; size];
  let mut i = 2;
  while i * i < size {
    if !composite[i] {
      let mut j = i * i;
      while j < size {
        composite[j] = true;
        j += i;
      }
    }
    i += 1;
  }
  (2..size).filter(|&k| !composite[k]).map(|k| k as i64).collect()
}

fn is_factor_separator(c: char) -> bool {
  c.is_whitespace() || matches!(c, 'x' | 'X' | '×' | '*' | '·' | '⋅' | ',' | ';')
}

/// Tokens of a free-text factor list.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FactorTokens {
  /// Tokens that parse as `i64`, in input order.
  pub values: Vec<i64>,
  /// Number-like tokens that are not an `i64` (decimals, overflow).
  pub invalid: Vec<String>,
}

impl FactorTokens {
  pub fn is_empty(&self) -> bool {
    self.values.is_empty() && self.invalid.is_empty()
  }
}

/// Split free text on separator runs (x, X, ×, *, ·, comma, semicolon,
/// whitespace). Tokens without any digit are dropped; a token with digits
/// that is not an `i64` lands in `invalid`. No primality or sign checks.
pub fn parse_factor_tokens(text: &str) -> FactorTokens {
  let mut out = FactorTokens::default();
  for tok in text.split(is_factor_separator).filter(|tok| !tok.is_empty()) {
    match tok.parse::<i64>() {
      Ok(v) => out.values.push(v),
      Err(_) if tok.chars().any(|c| c.is_ascii_digit()) => out.invalid.push(tok.to_string()),
      Err(_) => {}
    }
  }
  out
}

/// Integer tokens of a factor list; see `parse_factor_tokens`.
pub fn normalize_factor_list(text: &str) -> Vec<i64> {
  parse_factor_tokens(text).values
}

/// Order-independent, multiplicity-sensitive equality.
pub fn multiset_equals(a: &[i64], b: &[i64]) -> bool {
  if a.len() != b.len() {
    return false;
  }
  let mut a = a.to_vec();
  let mut b = b.to_vec();
  a.sort_unstable();
  b.sort_unstable();
  a == b
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn is_prime_boundaries() {
    assert!(!is_prime(-7));
    assert!(!is_prime(0));
    assert!(!is_prime(1));
    assert!(is_prime(2));
    assert!(is_prime(3));
    assert!(!is_prime(4));
    assert!(!is_prime(9));
    assert!(!is_prime(25));
    assert!(is_prime(29));
  }

  #[test]
  fn is_prime_matches_sieve_up_to_1000() {
    let sieve = primes_up_to(1000);
    for n in 0..=1000 {
      assert_eq!(is_prime(n), sieve.binary_search(&n).is_ok(), "n={n}");
    }
  }

  #[test]
  fn is_prime_handles_large_values_without_overflow() {
    assert!(is_prime(2_147_483_647));
    assert!(!is_prime(i64::MAX));
  }

  #[test]
  fn prime_factors_multiply_back_and_are_prime() {
    for n in 2..=2000 {
      let f = prime_factors(n);
      assert_eq!(f.iter().product::<i64>(), n, "n={n}");
      assert!(f.iter().all(|&p| is_prime(p)), "n={n} factors={f:?}");
      assert!(f.windows(2).all(|w| w[0] <= w[1]), "not ascending: {f:?}");
    }
  }

  #[test]
  fn prime_factors_examples_and_out_of_domain() {
    assert_eq!(prime_factors(12), vec![2, 2, 3]);
    assert_eq!(prime_factors(60), vec![2, 2, 3, 5]);
    assert_eq!(prime_factors(97), vec![97]);
    // residual prime above the loop bound
    assert_eq!(prime_factors(2 * 101), vec![2, 101]);
    assert!(prime_factors(1).is_empty());
    assert!(prime_factors(0).is_empty());
    assert!(prime_factors(-12).is_empty());
  }

  #[test]
  fn smallest_factor_divides_and_is_bounded() {
    for n in 2..=2000 {
      match smallest_factor(n) {
        Some(f) => {
          assert!(!is_prime(n), "n={n}");
          assert_eq!(n % f, 0);
          assert!(f * f <= n, "n={n} f={f}");
        }
        None => assert!(is_prime(n), "n={n}"),
      }
    }
    assert_eq!(smallest_factor(1), None);
    assert_eq!(smallest_factor(-4), None);
    assert_eq!(smallest_factor(21), Some(3));
  }

  #[test]
  fn digit_sum_rule() {
    assert_eq!(digit_sum(15), 6);
    assert_eq!(digit_sum(-492), 15);
    assert!(digit_sum_divisible_by_3(15));
    assert!(!digit_sum_divisible_by_3(16));
    for n in -300..=300 {
      assert_eq!(digit_sum_divisible_by_3(n), n % 3 == 0, "n={n}");
    }
  }

  #[test]
  fn divisibility_report_flags() {
    let r = divisibility_report(30);
    assert_eq!(r.digits, vec![3, 0]);
    assert_eq!(r.last_digit, 0);
    assert!(r.by2 && r.by3 && r.by5 && r.by6 && r.by10);

    let r = divisibility_report(14);
    assert!(r.by2 && !r.by3 && !r.by5 && !r.by6 && !r.by10);
    assert_eq!(r.digit_sum, 5);
  }

  #[test]
  fn factorization_steps_walk_down_to_one() {
    let steps = factorization_steps(60);
    let values: Vec<i64> = steps.iter().map(|s| s.value).collect();
    assert_eq!(values, vec![60, 30, 15, 5]);
    assert_eq!(steps.last().map(|s| s.quotient), Some(1));
    assert!(factorization_steps(1).is_empty());
  }

  #[test]
  fn primes_up_to_small_and_clamped() {
    assert_eq!(primes_up_to(20), vec![2, 3, 5, 7, 11, 13, 17, 19]);
    assert!(primes_up_to(1).is_empty());
    assert_eq!(primes_up_to(1_000_000).len(), primes_up_to(PRIMES_LIMIT_MAX).len());
  }

  #[test]
  fn normalize_accepts_every_separator() {
    let expected = vec![2, 2, 3, 5];
    for sep in ["x", "X", "×", "*", "·", ",", ";", " ", "\t", " x ", ", ", " ;  "] {
      let text = expected.iter().map(|n| n.to_string()).collect::<Vec<_>>().join(sep);
      assert_eq!(normalize_factor_list(&text), expected, "sep={sep:?}");
    }
  }

  #[test]
  fn normalize_collapses_runs_and_drops_junk() {
    assert_eq!(normalize_factor_list("  2 ×× 3,,;  7  "), vec![2, 3, 7]);
    assert_eq!(normalize_factor_list("2 and 3"), vec![2, 3]);
    assert_eq!(normalize_factor_list("2.5 x 4"), vec![4]);
    assert_eq!(normalize_factor_list("-3 x 0"), vec![-3, 0]);
    assert!(normalize_factor_list("").is_empty());
    assert!(normalize_factor_list("   \n ").is_empty());
    assert!(normalize_factor_list("abc").is_empty());
  }

  #[test]
  fn number_like_junk_is_kept_as_invalid() {
    let t = parse_factor_tokens("2x2x3x1.5");
    assert_eq!(t.values, vec![2, 2, 3]);
    assert_eq!(t.invalid, vec!["1.5".to_string()]);

    let t = parse_factor_tokens("3 x 99999999999999999999");
    assert_eq!(t.values, vec![3]);
    assert_eq!(t.invalid, vec!["99999999999999999999".to_string()]);

    let t = parse_factor_tokens("two times 6");
    assert_eq!(t.values, vec![6]);
    assert!(t.invalid.is_empty());
    assert!(parse_factor_tokens(" , x ").is_empty());
    assert!(!parse_factor_tokens("0.5").is_empty());
  }

  #[test]
  fn multiset_equality() {
    assert!(multiset_equals(&[2, 2, 3], &[3, 2, 2]));
    assert!(!multiset_equals(&[2, 2, 3], &[2, 3, 3]));
    assert!(!multiset_equals(&[2, 3], &[2, 3, 3]));
    assert!(multiset_equals(&[], &[]));
  }
}

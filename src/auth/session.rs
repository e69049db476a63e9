//! Session token generation.

/// Generate a new session token (32 alphanumeric characters)
pub fn generate_session_token() -> String {
  use rand::Rng;
  let mut rng = rand::rng();
  (0..32)
    .map(|_| {
      let idx = rng.random_range(0..36);
      if idx < 10 {
        (b'0' + idx) as char
      } else {
        (b'a' + idx - 10) as char
      }
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn tokens_are_well_formed_and_distinct() {
    let a = generate_session_token();
    let b = generate_session_token();
    assert_eq!(a.len(), 32);
    assert!(a.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    assert_ne!(a, b);
  }
}

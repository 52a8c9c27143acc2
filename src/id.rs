use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Length of a ticket id in hex characters
const ID_LEN: usize = 40;

/// Generate an opaque ticket id like "3f9a0c..." (40 hex chars).
/// Hashes a fresh UUID together with the title, retrying on collision.
pub fn generate(title: &str, existing: &[String]) -> String {
    loop {
        let id = digest(&[Uuid::new_v4().as_bytes(), title.as_bytes()]);
        if !existing.contains(&id) {
            return id;
        }
    }
}

/// Hash identifying one activity log entry
pub fn activity_sha(ticket_id: &str, date: &str, message: &str) -> String {
    digest(&[
        ticket_id.as_bytes(),
        date.as_bytes(),
        message.as_bytes(),
        Uuid::new_v4().as_bytes(),
    ])
}

fn digest(parts: &[&[u8]]) -> String {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    let hex = hex::encode(hasher.finalize());
    hex[..ID_LEN].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_is_lowercase_hex() {
        let id = generate("A title", &[]);
        assert_eq!(id.len(), ID_LEN);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_generate_avoids_existing() {
        let first = generate("same", &[]);
        let second = generate("same", &[first.clone()]);
        assert_ne!(first, second);
    }
}

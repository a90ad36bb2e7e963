use {
    base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD},
    sha2::{Digest, Sha256},
};

use crate::types::PkceChallenge;

/// Generate a fresh S256 PKCE pair from 32 random bytes.
pub fn generate() -> PkceChallenge {
    let bytes: [u8; 32] = rand::random();
    let verifier = URL_SAFE_NO_PAD.encode(bytes);
    let challenge = challenge_for(&verifier);
    PkceChallenge {
        verifier,
        challenge,
    }
}

/// `BASE64URL(SHA256(ascii(verifier)))` without padding.
pub fn challenge_for(verifier: &str) -> String {
    let digest = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(digest)
}

pub fn verify(verifier: &str, challenge: &str) -> bool {
    challenge_for(verifier) == challenge
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rfc7636_appendix_b_vector() {
        let verifier = "dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk";
        assert_eq!(
            challenge_for(verifier),
            "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM"
        );
    }

    #[test]
    fn generated_pair_verifies() {
        let pkce = generate();
        assert_eq!(pkce.verifier.len(), 43);
        assert!(verify(&pkce.verifier, &pkce.challenge));
        assert!(!verify("some-other-verifier", &pkce.challenge));
    }

    #[test]
    fn generated_pairs_differ() {
        assert_ne!(generate().verifier, generate().verifier);
    }
}

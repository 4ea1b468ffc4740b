use crate::number_theory::mod_pow;
use crate::rsa::keygen::{KeyGenError, PrivateKey, PublicKey, RsaKeyGenerator, RsaKeyPair};
use num_bigint::BigUint;

/// `block^e mod n` for every block. No padding: equal inputs give equal outputs.
pub fn encrypt(blocks: &[BigUint], key: &PublicKey) -> Vec<BigUint> {
    blocks.iter().map(|m| mod_pow(m, &key.e, &key.n)).collect()
}

/// `block^d mod n` for every block.
pub fn decrypt(blocks: &[BigUint], key: &PrivateKey) -> Vec<BigUint> {
    blocks.iter().map(|c| mod_pow(c, &key.d, &key.n)).collect()
}

/// A generated key pair together with single-block encryption.
pub struct RsaService {
    keypair: RsaKeyPair,
}

impl RsaService {
    pub fn new(bit_length: usize) -> Result<Self, KeyGenError> {
        let keypair = RsaKeyGenerator::new(bit_length).generate_keypair()?;
        Ok(Self { keypair })
    }

    pub fn from_keypair(keypair: RsaKeyPair) -> Self {
        Self { keypair }
    }

    /// Returns `None` when `m` does not fit below the modulus.
    pub fn encrypt(&self, m: &BigUint) -> Option<BigUint> {
        if m >= &self.keypair.n {
            return None;
        }
        Some(mod_pow(m, &self.keypair.e, &self.keypair.n))
    }

    pub fn decrypt(&self, c: &BigUint) -> BigUint {
        mod_pow(c, &self.keypair.d, &self.keypair.n)
    }

    pub fn public_key(&self) -> PublicKey {
        self.keypair.public_key()
    }

    pub fn private_key(&self) -> PrivateKey {
        self.keypair.private_key()
    }

    pub fn keypair(&self) -> &RsaKeyPair {
        &self.keypair
    }
}

//! Protocolo de firmas del gateway de pagos
//!
//! Codec HMAC-SHA512 sobre el conjunto canónico de parámetros vnp_*.
//! El mismo codec firma la URL saliente y verifica la notificación
//! entrante; cualquier asimetría entre ambos lados es un bug de seguridad.

use hmac::{Hmac, Mac};
use sha2::Sha512;
use std::collections::BTreeMap;

type HmacSha512 = Hmac<Sha512>;

/// Campo de firma en requests/responses del gateway
pub const SECURE_HASH_FIELD: &str = "vnp_SecureHash";
/// Campo opcional que anuncia el tipo de hash; excluido del cálculo
pub const SECURE_HASH_TYPE_FIELD: &str = "vnp_SecureHashType";

/// Construye el query string canónico: claves ordenadas ascendente,
/// clave y valor percent-encoded, unidos con '&', sin separador final.
/// Los valores vacíos no participan en la firma.
pub fn canonical_query(params: &BTreeMap<String, String>) -> String {
    let mut out = String::new();
    for (key, value) in params {
        if value.is_empty() {
            continue;
        }
        if !out.is_empty() {
            out.push('&');
        }
        out.push_str(&urlencoding::encode(key));
        out.push('=');
        out.push_str(&urlencoding::encode(value));
    }
    out
}

/// HMAC-SHA512 del query canónico, en hex minúsculas.
pub fn hmac_sha512_hex(secret: &str, data: &str) -> String {
    // HMAC acepta claves de cualquier longitud; new_from_slice no falla
    let mut mac = HmacSha512::new_from_slice(secret.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(data.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Firma un conjunto de parámetros para la URL de pago saliente.
pub fn sign_params(params: &BTreeMap<String, String>, secret: &str) -> String {
    hmac_sha512_hex(secret, &canonical_query(params))
}

/// Verifica la firma de una respuesta del gateway: recalcula el hash sobre
/// todos los parámetros excepto los campos de firma y compara exacto,
/// case-insensitive.
pub fn verify_signature(
    signature: &str,
    secret: &str,
    response_params: &BTreeMap<String, String>,
) -> bool {
    let mut signable: BTreeMap<String, String> = response_params.clone();
    signable.remove(SECURE_HASH_FIELD);
    signable.remove(SECURE_HASH_TYPE_FIELD);

    let expected = sign_params(&signable, secret);
    expected.eq_ignore_ascii_case(signature)
}

/// Firma de comandos query/refund de la API del gateway: input
/// pipe-delimited, sin URL-encoding. El formato difiere del caso de la URL
/// de pago y debe coincidir exactamente con lo que el gateway espera.
pub fn sign_command_fields(fields: &[&str], secret: &str) -> String {
    hmac_sha512_hex(secret, &fields.join("|"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn canonical_query_sorts_keys_ascending() {
        let p = params(&[
            ("vnp_TxnRef", "abc"),
            ("vnp_Amount", "50000000"),
            ("vnp_Command", "pay"),
        ]);
        assert_eq!(
            canonical_query(&p),
            "vnp_Amount=50000000&vnp_Command=pay&vnp_TxnRef=abc"
        );
    }

    #[test]
    fn canonical_query_percent_encodes_values() {
        let p = params(&[("vnp_OrderInfo", "Thanh toan dat coc xe")]);
        assert_eq!(
            canonical_query(&p),
            "vnp_OrderInfo=Thanh%20toan%20dat%20coc%20xe"
        );
    }

    #[test]
    fn canonical_query_skips_empty_values_and_trailing_separator() {
        let p = params(&[("vnp_BankCode", ""), ("vnp_Amount", "100")]);
        assert_eq!(canonical_query(&p), "vnp_Amount=100");
        let empty = params(&[]);
        assert_eq!(canonical_query(&empty), "");
    }

    #[test]
    fn hmac_is_lowercase_hex() {
        let mac = hmac_sha512_hex("secret", "data");
        assert_eq!(mac.len(), 128);
        assert!(mac.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn sign_then_verify_round_trips() {
        let secret = "RAOEXHYVSDDIIENYWSLDIIZTANXUXZFJ";
        let mut p = params(&[
            ("vnp_TxnRef", "7d1b1f7a-53b8-4bd7-b3f0-0f4b0f6a2a11"),
            ("vnp_Amount", "50000000"),
            ("vnp_ResponseCode", "00"),
            ("vnp_TransactionNo", "14226112"),
        ]);
        let signature = sign_params(&p, secret);
        p.insert(SECURE_HASH_FIELD.to_string(), signature.clone());
        p.insert(SECURE_HASH_TYPE_FIELD.to_string(), "HMACSHA512".to_string());
        assert!(verify_signature(&signature, secret, &p));
    }

    #[test]
    fn verify_is_case_insensitive_on_the_signature() {
        let secret = "secret";
        let mut p = params(&[("vnp_Amount", "100")]);
        let signature = sign_params(&p, secret).to_uppercase();
        p.insert(SECURE_HASH_FIELD.to_string(), signature.clone());
        assert!(verify_signature(&signature, secret, &p));
    }

    #[test]
    fn verify_rejects_tampered_params() {
        let secret = "secret";
        let mut p = params(&[("vnp_Amount", "50000000")]);
        let signature = sign_params(&p, secret);
        p.insert("vnp_Amount".to_string(), "40000000".to_string());
        p.insert(SECURE_HASH_FIELD.to_string(), signature.clone());
        assert!(!verify_signature(&signature, secret, &p));
    }

    #[test]
    fn verify_rejects_wrong_secret() {
        let mut p = params(&[("vnp_Amount", "100")]);
        let signature = sign_params(&p, "secret-a");
        p.insert(SECURE_HASH_FIELD.to_string(), signature.clone());
        assert!(!verify_signature(&signature, "secret-b", &p));
    }

    #[test]
    fn command_signature_is_pipe_delimited_not_urlencoded() {
        let secret = "secret";
        let direct = hmac_sha512_hex(secret, "querydr|REQ01|ORDER 01");
        // El espacio pasa sin encoding en el formato de comandos
        assert_eq!(
            sign_command_fields(&["querydr", "REQ01", "ORDER 01"], secret),
            direct
        );
    }
}

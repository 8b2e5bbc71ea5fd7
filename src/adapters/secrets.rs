//! Secret fetching utilities for Kubernetes secrets

use k8s_openapi::api::core::v1::Secret;
use kube::{Api, Client};

use crate::crd::AuthSecretRef;
use crate::error::{Error, Result};

/// Fetch a secret from Kubernetes
pub async fn get_secret(client: &Client, name: &str, namespace: &str) -> Result<Secret> {
    let secrets: Api<Secret> = Api::namespaced(client.clone(), namespace);
    secrets.get(name).await.map_err(|e| match e {
        kube::Error::Api(api_err) if api_err.code == 404 => {
            Error::SecretNotFound(format!("{}/{}", namespace, name))
        }
        other => Error::Kube(other),
    })
}

/// Get a non-empty string value from a secret
pub fn get_secret_string(secret: &Secret, key: &str) -> Result<String> {
    let missing = || Error::SecretKeyNotFound {
        secret: secret.metadata.name.clone().unwrap_or_default(),
        key: key.to_string(),
    };

    let bytes = secret
        .data
        .as_ref()
        .and_then(|data| data.get(key))
        .ok_or_else(missing)?;

    let value = String::from_utf8(bytes.0.clone())
        .map_err(|e| Error::config(format!("Invalid UTF-8 in secret key '{}': {}", key, e)))?;

    // Tokens pasted with `kubectl create secret --from-file` usually end with a newline
    let value = value.trim().to_string();
    if value.is_empty() {
        return Err(missing());
    }
    Ok(value)
}

/// Fetch the put.io token referenced by a Feed
pub async fn get_auth_token(
    client: &Client,
    namespace: &str,
    secret_ref: &AuthSecretRef,
) -> Result<String> {
    let secret = get_secret(client, &secret_ref.name, namespace).await?;
    get_secret_string(&secret, &secret_ref.key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
    use k8s_openapi::ByteString;
    use std::collections::BTreeMap;

    fn secret(key: &str, value: &[u8]) -> Secret {
        Secret {
            metadata: ObjectMeta {
                name: Some("putio".to_string()),
                ..Default::default()
            },
            data: Some(BTreeMap::from([(key.to_string(), ByteString(value.to_vec()))])),
            ..Default::default()
        }
    }

    #[test]
    fn test_reads_and_trims_token() {
        let s = secret("token", b"abc123\n");
        assert_eq!(get_secret_string(&s, "token").unwrap(), "abc123");
    }

    #[test]
    fn test_missing_key_is_reported() {
        let s = secret("token", b"abc123");
        let err = get_secret_string(&s, "other").unwrap_err();
        assert!(matches!(err, Error::SecretKeyNotFound { ref key, .. } if key == "other"));
    }

    #[test]
    fn test_blank_token_counts_as_missing() {
        let s = secret("token", b"  \n");
        assert!(matches!(
            get_secret_string(&s, "token"),
            Err(Error::SecretKeyNotFound { .. })
        ));
    }

    #[test]
    fn test_invalid_utf8_is_config_error() {
        let s = secret("token", &[0xff, 0xfe]);
        assert!(matches!(get_secret_string(&s, "token"), Err(Error::Config(_))));
    }
}

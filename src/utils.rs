use chrono::{SecondsFormat, Utc};

// block timestamps are frozen strings; this is the only place they are minted
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

#[cfg(feature = "tls")]
pub use tls::{load_certs, load_key};

#[cfg(feature = "tls")]
mod tls {
    use anyhow::{Context, Result};
    use rustls::pki_types::{CertificateDer, PrivateKeyDer};
    use rustls_pemfile::{certs, read_one, Item};
    use std::{fs::File, io::BufReader};

    // reads a cert file and gives back all x509 certs in it
    pub fn load_certs(path: &str) -> Result<Vec<CertificateDer<'static>>> {
        let file = File::open(path)
            .with_context(|| format!("opening certificate file `{}`", path))?;
        let mut rd = BufReader::new(file);

        let raw_certs: Vec<_> = certs(&mut rd)
            .collect::<std::result::Result<_, _>>()
            .context("reading certificates from PEM")?;
        if raw_certs.is_empty() {
            anyhow::bail!("no certificate found in `{}`", path);
        }
        Ok(raw_certs)
    }

    // first private key in a PEM file (pkcs8, sec1 or pkcs1)
    pub fn load_key(path: &str) -> Result<PrivateKeyDer<'static>> {
        let mut rd = BufReader::new(File::open(path)
            .with_context(|| format!("opening key file `{}`", path))?);

        loop {
            match read_one(&mut rd)
                .context("reading PEM block")?
            {
                Some(Item::Pkcs8Key(key)) => return Ok(PrivateKeyDer::from(key)),
                Some(Item::Sec1Key(key))  => return Ok(PrivateKeyDer::from(key)),
                Some(Item::Pkcs1Key(key)) => return Ok(PrivateKeyDer::from(key)),
                Some(_)                   => continue,
                None                      => break,
            }
        }
        anyhow::bail!("no private key found in `{}`", path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamps_are_utc_rfc3339_with_micros() {
        let ts = now_timestamp();
        assert!(ts.ends_with('Z'));
        assert!(chrono::DateTime::parse_from_rfc3339(&ts).is_ok());
        assert_eq!(ts.split('.').nth(1).map(|f| f.len()), Some(7)); // 6 digits + Z
    }
}

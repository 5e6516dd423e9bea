//! Layer merging.

/// Recursively deep-merge `overlay` into `base`.
///
/// Tables merge per key. Scalars and arrays from the overlay replace the
/// base value.
pub(crate) fn deep_merge(base: &mut toml::Value, overlay: &toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                if let Some(base_val) = base_table.get_mut(key) {
                    deep_merge(base_val, overlay_val);
                } else {
                    base_table.insert(key.clone(), overlay_val.clone());
                }
            }
        },
        (base, overlay) => {
            *base = overlay.clone();
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> toml::Value {
        toml::from_str(s).unwrap()
    }

    #[test]
    fn test_tables_merge_per_key() {
        let mut base = parse("[claims]\nissuer = \"arbor\"\nttl_secs = 900\n");
        deep_merge(&mut base, &parse("[claims]\nttl_secs = 60\n"));

        let claims = base.get("claims").unwrap();
        assert_eq!(claims.get("issuer").unwrap().as_str(), Some("arbor"));
        assert_eq!(claims.get("ttl_secs").unwrap().as_integer(), Some(60));
    }

    #[test]
    fn test_arrays_replace() {
        let mut base = parse("[logging]\ndirectives = [\"a=debug\", \"b=info\"]\n");
        deep_merge(&mut base, &parse("[logging]\ndirectives = [\"c=trace\"]\n"));

        let directives = base
            .get("logging")
            .and_then(|l| l.get("directives"))
            .and_then(toml::Value::as_array)
            .unwrap();
        assert_eq!(directives.len(), 1);
    }

    #[test]
    fn test_new_sections_are_added() {
        let mut base = parse("[logging]\nlevel = \"warn\"\n");
        deep_merge(&mut base, &parse("[catalog]\npath = \"/tmp/c.toml\"\n"));
        assert!(base.get("logging").is_some());
        assert_eq!(
            base.get("catalog")
                .and_then(|c| c.get("path"))
                .and_then(toml::Value::as_str),
            Some("/tmp/c.toml")
        );
    }
}

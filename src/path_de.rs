use serde::de::DeserializeOwned;

/// Deserialize JSON, naming the offending field in the error message:
/// `at elements[0].kind: unknown variant ...`. Failures at the document root
/// carry the bare serde message.
pub fn from_str_with_path<T: DeserializeOwned>(src: &str) -> Result<T, String> {
    let mut de = serde_json::Deserializer::from_str(src);
    serde_path_to_error::deserialize(&mut de).map_err(|err| {
        let path = err.path().to_string();
        let inner = err.into_inner();
        if path == "." { inner.to_string() } else { format!("at {path}: {inner}") }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Outer {
        #[allow(dead_code)]
        inner: Inner,
    }

    #[derive(Debug, Deserialize)]
    struct Inner {
        #[allow(dead_code)]
        count: u32,
    }

    #[test]
    fn error_names_the_failing_path() {
        let err = from_str_with_path::<Outer>(r#"{"inner": {"count": "x"}}"#).unwrap_err();
        assert!(err.starts_with("at inner.count: "), "{err}");
    }

    #[test]
    fn root_errors_have_no_path() {
        let err = from_str_with_path::<Outer>("[]").unwrap_err();
        assert!(!err.starts_with("at "), "{err}");
    }
}

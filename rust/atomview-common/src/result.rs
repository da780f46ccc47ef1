pub type Result<T> = std::result::Result<T, crate::error::Error>;

#[macro_export]
macro_rules! verify_arg {
    ($name:expr, $expr:expr) => {{
        let result = $expr;
        $crate::result::verify_arg(result, stringify!($name), stringify!($expr))?;
    }};
}

#[inline]
pub fn verify_arg(predicate: bool, name: &str, condition: &str) -> Result<()> {
    if predicate {
        Ok(())
    } else {
        invalid_arg(name, condition)
    }
}

#[cold]
pub fn invalid_arg(name: &str, condition: &str) -> Result<()> {
    Err(crate::error::ErrorKind::InvalidArgument {
        name: name.to_string(),
        message: condition.to_string(),
    }
    .into())
}

#[cfg(test)]
mod tests {
    use crate::ErrorClass;

    fn checked(len: usize) -> super::Result<usize> {
        verify_arg!(len, len <= 8);
        Ok(len)
    }

    #[test]
    fn test_verify_arg() {
        assert_eq!(checked(4).unwrap(), 4);
        let e = checked(9).unwrap_err();
        assert_eq!(e.class(), ErrorClass::InvalidArgument);
        assert_eq!(e.to_string(), "invalid argument len: len <= 8");
    }
}

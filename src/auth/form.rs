//! Login form parsing.
//!
//! The browser posts `user=<name>&password=<secret>`. Fields are taken by
//! position and their values passed through verbatim.

/// User and password from a login form, in posted order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginForm {
    pub user: String,
    pub password: String,
}

/// Parse the first two `&`-separated fields as user and password.
///
/// Each value is everything after the field's first `=`.
pub fn parse_login_form(body: &[u8]) -> Option<LoginForm> {
    let text = std::str::from_utf8(body).ok()?;
    let mut fields = text.split('&');
    let user = field_value(fields.next()?)?;
    let password = field_value(fields.next()?)?;
    Some(LoginForm {
        user: user.to_owned(),
        password: password.to_owned(),
    })
}

fn field_value(field: &str) -> Option<&str> {
    field.split_once('=').map(|(_, value)| value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordered_fields() {
        let form = parse_login_form(b"user=alice&password=secret").unwrap();
        assert_eq!(form.user, "alice");
        assert_eq!(form.password, "secret");
    }

    #[test]
    fn test_values_are_verbatim() {
        let form = parse_login_form(b"user=bob&password=a=b&extra=1").unwrap();
        assert_eq!(form.password, "a=b");
    }

    #[test]
    fn test_incomplete_forms() {
        assert!(parse_login_form(b"user=alice").is_none());
        assert!(parse_login_form(b"user=alice&password").is_none());
        assert!(parse_login_form(b"").is_none());
        assert!(parse_login_form(&[0xff, 0xfe]).is_none());
    }
}

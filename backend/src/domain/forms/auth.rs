//! Sign-in, sign-up and password reset forms.

use serde::{Deserialize, Serialize, Serializer};
use utoipa::ToSchema;
use zeroize::Zeroizing;

use super::{Schema, wire_enum};
use crate::domain::validation::{Issues, Validator};

/// Minimum password length for new passwords.
pub const PASSWORD_MIN: usize = 6;

const PASSWORD_COMPLEXITY_MESSAGE: &str =
    "Password must contain at least one number, one uppercase letter, and one special character";

fn serialize_secret<S: Serializer>(value: &Zeroizing<String>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(value.as_str())
}

/// Check the new-password rule: at least [`PASSWORD_MIN`] characters and at
/// least one digit, one uppercase letter and one non-alphanumeric character.
///
/// Returns every message that applies.
///
/// # Examples
/// ```
/// use portal::domain::forms::check_password_strength;
///
/// assert!(check_password_strength("Abc123!").is_empty());
/// assert!(!check_password_strength("abc123").is_empty());
/// ```
#[must_use]
pub fn check_password_strength(password: &str) -> Vec<String> {
    let mut messages = Vec::new();
    if password.chars().count() < PASSWORD_MIN {
        messages.push(format!("Password must be at least {PASSWORD_MIN} characters"));
    }
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_upper = password.chars().any(char::is_uppercase);
    let has_special = password.chars().any(|c| !c.is_alphanumeric());
    if !(has_digit && has_upper && has_special) {
        messages.push(PASSWORD_COMPLEXITY_MESSAGE.to_owned());
    }
    messages
}

fn new_password(v: &mut Validator, path: &str, value: Option<String>) -> Option<Zeroizing<String>> {
    let password = Zeroizing::new(v.required_raw(path, value)?);
    let messages = check_password_strength(&password);
    if messages.is_empty() {
        return Some(password);
    }
    for message in messages {
        v.fail(path, message);
    }
    None
}

/// Raw sign-in submission.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct SignInInput {
    /// Account email.
    pub email: Option<String>,
    /// Account password.
    pub password: Option<String>,
}

/// Validated sign-in credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignIn {
    email: String,
    #[serde(serialize_with = "serialize_secret")]
    password: Zeroizing<String>,
}

impl SignIn {
    /// Lower-cased email.
    pub fn email(&self) -> &str {
        &self.email
    }
}

impl Schema for SignIn {
    type Input = SignInInput;

    fn validate(input: SignInInput) -> Result<Self, Issues> {
        let mut v = Validator::new();
        let email = v.required("email", input.email).and_then(|e| v.email("email", e));
        let password = v.required_raw("password", input.password).map(Zeroizing::new);
        v.finish(|| {
            Some(Self {
                email: email?,
                password: password?,
            })
        })
    }
}

wire_enum! {
    /// Kind of account being registered.
    pub enum AccountType {
        Individual => "individual",
        Organization => "organization",
    }
}

/// Raw sign-up submission.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct SignUpInput {
    /// Display name.
    pub name: Option<String>,
    /// Account email.
    pub email: Option<String>,
    /// Account password.
    pub password: Option<String>,
    /// `individual` or `organization`.
    #[serde(rename = "type")]
    pub account_type: Option<String>,
    /// Membership category.
    pub category: Option<String>,
}

/// Validated sign-up request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignUp {
    name: String,
    email: String,
    #[serde(serialize_with = "serialize_secret")]
    password: Zeroizing<String>,
    #[serde(rename = "type")]
    account_type: AccountType,
    category: String,
}

impl SignUp {
    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Lower-cased email.
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Account type.
    pub fn account_type(&self) -> AccountType {
        self.account_type
    }
}

impl Schema for SignUp {
    type Input = SignUpInput;

    fn validate(input: SignUpInput) -> Result<Self, Issues> {
        let mut v = Validator::new();
        let name = v
            .required("name", input.name)
            .and_then(|n| v.length("name", n, 2, 50));
        let email = v.required("email", input.email).and_then(|e| v.email("email", e));
        let password = new_password(&mut v, "password", input.password);
        let account_type = v
            .required("type", input.account_type)
            .and_then(|t| v.one_of::<AccountType>("type", t, AccountType::VALUES));
        let category = v
            .required("category", input.category)
            .and_then(|c| v.length("category", c, 1, 50));
        v.finish(|| {
            Some(Self {
                name: name?,
                email: email?,
                password: password?,
                account_type: account_type?,
                category: category?,
            })
        })
    }
}

/// Raw password reset request.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct PasswordResetRequestInput {
    /// Account email.
    pub email: Option<String>,
    /// Account phone number.
    pub phone: Option<String>,
}

/// Validated password reset request: at least one contact route is present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PasswordResetRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    phone: Option<String>,
}

impl PasswordResetRequest {
    /// Email the link goes to, if given.
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    /// Phone the link goes to, if given.
    pub fn phone(&self) -> Option<&str> {
        self.phone.as_deref()
    }
}

impl Schema for PasswordResetRequest {
    type Input = PasswordResetRequestInput;

    fn validate(input: PasswordResetRequestInput) -> Result<Self, Issues> {
        let email_raw = Validator::optional(input.email);
        let phone_raw = Validator::optional(input.phone);
        if email_raw.is_none() && phone_raw.is_none() {
            return Err(Issues::root("Either email or phone is required"));
        }

        let mut v = Validator::new();
        let email = email_raw.map(|e| v.email("email", e));
        let phone = phone_raw.map(|p| v.phone("phone", p));
        v.finish(|| {
            Some(Self {
                email: email.map_or(Some(None), |e| e.map(Some))?,
                phone: phone.map_or(Some(None), |p| p.map(Some))?,
            })
        })
    }
}

/// Raw password reset confirmation.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PasswordResetConfirmInput {
    /// Reset token from the email link.
    pub token: Option<String>,
    /// New password.
    pub password: Option<String>,
    /// Repeat of the new password.
    pub confirm_password: Option<String>,
}

/// Validated new password bound to a reset token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PasswordResetConfirm {
    token: String,
    #[serde(serialize_with = "serialize_secret")]
    password: Zeroizing<String>,
}

impl Schema for PasswordResetConfirm {
    type Input = PasswordResetConfirmInput;

    fn validate(input: PasswordResetConfirmInput) -> Result<Self, Issues> {
        let mut v = Validator::new();
        let token = v.required("token", input.token);
        let confirm = Zeroizing::new(input.confirm_password.unwrap_or_default());
        let password = new_password(&mut v, "password", input.password);
        if let Some(password) = &password {
            if password.as_str() != confirm.as_str() {
                v.fail("confirmPassword", "Passwords do not match");
            }
        }
        v.finish(|| {
            Some(Self {
                token: token?,
                password: password?,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    //! Schema behaviour for the authentication forms.
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn sign_up(password: &str) -> SignUpInput {
        SignUpInput {
            name: Some("Ada Lovelace".to_owned()),
            email: Some("ada@example.org".to_owned()),
            password: Some(password.to_owned()),
            account_type: Some("individual".to_owned()),
            category: Some("engineering".to_owned()),
        }
    }

    #[rstest]
    #[case("abc123", false)]
    #[case("Abc123!", true)]
    #[case("Ab1!", false)]
    #[case("ABCDEF!", false)]
    #[case("Abcdef1", false)]
    fn sign_up_password_rule(#[case] password: &str, #[case] ok: bool) {
        let result = SignUp::validate(sign_up(password));
        assert_eq!(result.is_ok(), ok, "password {password:?}");
        if let Err(issues) = result {
            assert!(issues.has_field("password"));
            assert!(issues.iter().all(|i| i.path.as_deref() == Some("password")));
        }
    }

    #[test]
    fn sign_up_reports_every_missing_field() {
        let issues = SignUp::validate(SignUpInput::default()).expect_err("empty form");
        for field in ["name", "email", "password", "type", "category"] {
            assert!(issues.has_field(field), "missing issue for {field}");
        }
    }

    #[test]
    fn sign_up_rejects_unknown_account_type() {
        let mut input = sign_up("Abc123!");
        input.account_type = Some("robot".to_owned());
        let issues = SignUp::validate(input).expect_err("unknown type");
        let message = &issues.for_field("type").next().expect("type issue").message;
        assert_eq!(message, "Type must be one of: individual, organization");
    }

    #[test]
    fn sign_up_serialises_wire_shape() {
        let entity = SignUp::validate(sign_up("Abc123!")).expect("valid");
        let value = serde_json::to_value(&entity).expect("serialise");
        assert_eq!(value["type"], "individual");
        assert_eq!(value["password"], "Abc123!");
    }

    #[rstest]
    #[case(json!({}), &["email", "password"])]
    #[case(json!({ "email": "ada@example.org" }), &["password"])]
    #[case(json!({ "email": "nope", "password": "x" }), &["email"])]
    fn sign_in_missing_fields(#[case] raw: serde_json::Value, #[case] fields: &[&str]) {
        let issues = SignIn::parse_json(raw).expect_err("invalid sign-in");
        for field in fields {
            assert!(issues.has_field(field), "expected issue for {field}");
        }
        assert_eq!(issues.len(), fields.len());
    }

    #[test]
    fn sign_in_keeps_password_whitespace() {
        let entity = SignIn::parse_json(json!({ "email": " Ada@Example.org ", "password": " pw " }))
            .expect("valid");
        assert_eq!(entity.email(), "ada@example.org");
        assert_eq!(entity.password.as_str(), " pw ");
    }

    #[test]
    fn reset_request_needs_email_or_phone() {
        let issues = PasswordResetRequest::validate(PasswordResetRequestInput {
            email: None,
            phone: Some("  ".to_owned()),
        })
        .expect_err("both absent");
        assert_eq!(issues.len(), 1);
        let issue = issues.roots().next().expect("root issue");
        assert_eq!(issue.message, "Either email or phone is required");
    }

    #[rstest]
    #[case(Some("ada@example.org"), None)]
    #[case(None, Some("+44 20 7946 0958"))]
    #[case(Some("ada@example.org"), Some("02079460958"))]
    fn reset_request_accepts_either_route(#[case] email: Option<&str>, #[case] phone: Option<&str>) {
        let entity = PasswordResetRequest::validate(PasswordResetRequestInput {
            email: email.map(str::to_owned),
            phone: phone.map(str::to_owned),
        })
        .expect("valid request");
        assert_eq!(entity.email().is_some(), email.is_some());
        assert_eq!(entity.phone().is_some(), phone.is_some());
    }

    #[test]
    fn reset_request_still_checks_supplied_values() {
        let issues = PasswordResetRequest::validate(PasswordResetRequestInput {
            email: Some("not-an-email".to_owned()),
            phone: None,
        })
        .expect_err("bad email");
        assert!(issues.has_field("email"));
    }

    #[test]
    fn reset_confirm_requires_matching_passwords() {
        let issues = PasswordResetConfirm::validate(PasswordResetConfirmInput {
            token: Some("t0k3n".to_owned()),
            password: Some("Abc123!".to_owned()),
            confirm_password: Some("Abc123?".to_owned()),
        })
        .expect_err("mismatch");
        assert!(issues.has_field("confirmPassword"));
        assert!(!issues.has_field("password"));
    }

    #[test]
    fn reset_confirm_accepts_matching_passwords() {
        let entity = PasswordResetConfirm::validate(PasswordResetConfirmInput {
            token: Some("t0k3n".to_owned()),
            password: Some("Abc123!".to_owned()),
            confirm_password: Some("Abc123!".to_owned()),
        })
        .expect("match");
        let value = serde_json::to_value(&entity).expect("serialise");
        assert_eq!(value, json!({ "token": "t0k3n", "password": "Abc123!" }));
    }
}

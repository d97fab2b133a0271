//! Form values as entered by a user, and their conversion into request bodies.
//!
//! Form inputs are plain strings. Before anything is sent, empty strings in
//! optional text, URL and numeric fields become `None` so the server never sees
//! `""` standing in for "no value". Converted bodies are then checked with
//! their `validator` rules.

use validator::Validate;

use crate::error::AppError;
use crate::models::{
    Category, NewPassword, PatternCreate, PatternFiles, PatternPublic, PatternUpdate,
    UpdatePassword, UserCreate, UserRegister, UserUpdate,
};

/// Error text when a password and its confirmation differ
pub const PASSWORDS_DO_NOT_MATCH: &str = "The passwords do not match";

/// `""` becomes `None`, anything else is kept verbatim.
pub fn empty_to_none(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn required<T>(value: &str, field: &str) -> Result<T, AppError>
where
    T: std::str::FromStr<Err = anyhow::Error>,
{
    if value.is_empty() {
        return Err(AppError::InvalidInput(format!("{} is required.", field)));
    }
    value
        .parse()
        .map_err(|e: anyhow::Error| AppError::InvalidInput(e.to_string()))
}

fn optional_category(value: &str) -> Result<Option<Category>, AppError> {
    if value.is_empty() {
        return Ok(None);
    }
    value
        .parse()
        .map(Some)
        .map_err(|e: anyhow::Error| AppError::InvalidInput(e.to_string()))
}

fn difficulty(value: &str) -> Result<u8, AppError> {
    if value.is_empty() {
        return Err(AppError::InvalidInput("Difficulty is required.".to_string()));
    }
    value
        .trim()
        .parse()
        .map_err(|_| AppError::InvalidInput(format!("Invalid difficulty: {}", value)))
}

/// Zero counts as "no amount", like an empty field.
fn fabric_amount(value: &str) -> Result<Option<f64>, AppError> {
    if value.is_empty() {
        return Ok(None);
    }
    let amount: f64 = value
        .trim()
        .parse()
        .map_err(|_| AppError::InvalidInput(format!("Invalid fabric amount: {}", value)))?;
    if !amount.is_finite() {
        return Err(AppError::InvalidInput(format!(
            "Invalid fabric amount: {}",
            value
        )));
    }
    if amount == 0.0 {
        Ok(None)
    } else {
        Ok(Some(amount))
    }
}

/// Pattern fields as typed into the add/edit dialog
#[derive(Debug, Clone, PartialEq)]
pub struct PatternForm {
    pub title: String,
    pub description: String,
    pub brand: String,
    pub version: String,
    pub for_who: String,
    pub category: String,
    pub difficulty: String,
    pub fabric: String,
    pub fabric_amount: String,
    pub pattern_url: String,
}

impl Default for PatternForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            brand: String::new(),
            version: "Digital".to_string(),
            for_who: "Women".to_string(),
            category: String::new(),
            difficulty: String::new(),
            fabric: String::new(),
            fabric_amount: String::new(),
            pattern_url: String::new(),
        }
    }
}

impl PatternForm {
    /// Prefill from a stored pattern, as the edit dialog does.
    pub fn from_pattern(pattern: &PatternPublic) -> Self {
        Self {
            title: pattern.title.clone(),
            description: pattern.description.clone().unwrap_or_default(),
            brand: pattern.brand.to_string(),
            version: pattern.version.to_string(),
            for_who: pattern.for_who.to_string(),
            category: pattern
                .category
                .map(|c| c.to_string())
                .unwrap_or_default(),
            difficulty: pattern.difficulty.to_string(),
            fabric: pattern.fabric.clone().unwrap_or_default(),
            fabric_amount: pattern
                .fabric_amount
                .map(|a| a.to_string())
                .unwrap_or_default(),
            pattern_url: pattern.pattern_url.clone().unwrap_or_default(),
        }
    }

    /// Normalize into a create body and validate it.
    pub fn to_create(&self) -> Result<PatternCreate, AppError> {
        let body = PatternCreate {
            title: self.title.clone(),
            description: empty_to_none(&self.description),
            brand: required(&self.brand, "Brand")?,
            version: required(&self.version, "Version")?,
            pattern_url: empty_to_none(&self.pattern_url),
            for_who: required(&self.for_who, "For who")?,
            category: optional_category(&self.category)?,
            difficulty: difficulty(&self.difficulty)?,
            fabric: empty_to_none(&self.fabric),
            fabric_amount: fabric_amount(&self.fabric_amount)?,
        };
        body.validate()?;
        Ok(body)
    }

    /// Normalize into a full update body. Cleared optional fields are sent as
    /// explicit `null`.
    pub fn to_update(&self) -> Result<PatternUpdate, AppError> {
        let body = PatternUpdate {
            title: Some(self.title.clone()),
            description: Some(empty_to_none(&self.description)),
            brand: Some(required(&self.brand, "Brand")?),
            version: Some(required(&self.version, "Version")?),
            pattern_url: Some(empty_to_none(&self.pattern_url)),
            for_who: Some(required(&self.for_who, "For who")?),
            category: Some(optional_category(&self.category)?),
            difficulty: Some(difficulty(&self.difficulty)?),
            fabric: Some(empty_to_none(&self.fabric)),
            fabric_amount: Some(fabric_amount(&self.fabric_amount)?),
        };
        body.validate()?;
        Ok(body)
    }
}

/// The add-pattern dialog: entity fields plus up to eight file selections
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AddPatternForm {
    pub fields: PatternForm,
    pub files: PatternFiles,
}

impl AddPatternForm {
    pub fn new(fields: PatternForm, files: PatternFiles) -> Self {
        Self { fields, files }
    }

    /// Back to the dialog defaults.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// The edit-pattern dialog, prefilled from the stored record
pub type EditPatternForm = PatternForm;

/// Self-service sign-up form
#[derive(Debug, Clone, Default)]
pub struct SignUpForm {
    pub email: String,
    pub full_name: String,
    pub password: String,
    pub confirm_password: String,
}

impl SignUpForm {
    pub fn to_register(&self) -> Result<UserRegister, AppError> {
        if self.full_name.is_empty() {
            return Err(AppError::InvalidInput("Full name is required".to_string()));
        }
        confirm(&self.password, &self.confirm_password)?;
        let body = UserRegister {
            email: self.email.clone(),
            password: self.password.clone(),
            full_name: Some(self.full_name.clone()),
        };
        body.validate()?;
        Ok(body)
    }
}

/// Admin "add user" form
#[derive(Debug, Clone, Default)]
pub struct AddUserForm {
    pub email: String,
    pub full_name: String,
    pub password: String,
    pub confirm_password: String,
    pub is_superuser: bool,
    pub is_active: bool,
}

impl AddUserForm {
    pub fn to_create(&self) -> Result<UserCreate, AppError> {
        confirm(&self.password, &self.confirm_password)?;
        let body = UserCreate {
            email: self.email.clone(),
            password: self.password.clone(),
            full_name: empty_to_none(&self.full_name),
            is_active: self.is_active,
            is_superuser: self.is_superuser,
        };
        body.validate()?;
        Ok(body)
    }
}

/// Admin "edit user" form; an empty password leaves it unchanged
#[derive(Debug, Clone, Default)]
pub struct EditUserForm {
    pub email: String,
    pub full_name: String,
    pub password: String,
    pub confirm_password: String,
    pub is_superuser: bool,
    pub is_active: bool,
}

impl EditUserForm {
    pub fn to_update(&self) -> Result<UserUpdate, AppError> {
        let password = if self.password.is_empty() {
            None
        } else {
            confirm(&self.password, &self.confirm_password)?;
            Some(self.password.clone())
        };
        let body = UserUpdate {
            email: empty_to_none(&self.email),
            password,
            full_name: empty_to_none(&self.full_name),
            is_active: Some(self.is_active),
            is_superuser: Some(self.is_superuser),
        };
        body.validate()?;
        Ok(body)
    }
}

/// Change-password form in the user settings
#[derive(Debug, Clone, Default)]
pub struct ChangePasswordForm {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

impl ChangePasswordForm {
    pub fn to_update(&self) -> Result<UpdatePassword, AppError> {
        confirm(&self.new_password, &self.confirm_password)?;
        let body = UpdatePassword {
            current_password: self.current_password.clone(),
            new_password: self.new_password.clone(),
        };
        body.validate()?;
        Ok(body)
    }
}

/// Reset-password form reached from the recovery email
#[derive(Debug, Clone, Default)]
pub struct ResetPasswordForm {
    pub token: String,
    pub new_password: String,
    pub confirm_password: String,
}

impl ResetPasswordForm {
    pub fn to_new_password(&self) -> Result<NewPassword, AppError> {
        confirm(&self.new_password, &self.confirm_password)?;
        let body = NewPassword {
            token: self.token.clone(),
            new_password: self.new_password.clone(),
        };
        body.validate()?;
        Ok(body)
    }
}

fn confirm(password: &str, confirmation: &str) -> Result<(), AppError> {
    if password != confirmation {
        return Err(AppError::InvalidInput(PASSWORDS_DO_NOT_MATCH.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Brand, ForWho, Version};
    use serde_json::json;

    fn tee_shirt() -> PatternForm {
        PatternForm {
            title: "Tee Shirt".to_string(),
            brand: "Seamwork".to_string(),
            difficulty: "2".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn defaults_match_dialog() {
        let form = PatternForm::default();
        assert_eq!(form.version, "Digital");
        assert_eq!(form.for_who, "Women");
        assert!(form.title.is_empty());
    }

    #[test]
    fn empty_optionals_become_null() {
        let body = tee_shirt().to_create().unwrap();
        assert_eq!(body.title, "Tee Shirt");
        assert_eq!(body.brand, Brand::Seamwork);
        assert_eq!(body.version, Version::Digital);
        assert_eq!(body.for_who, ForWho::Women);
        assert_eq!(body.description, None);
        assert_eq!(body.category, None);
        assert_eq!(body.fabric, None);
        assert_eq!(body.fabric_amount, None);
        assert_eq!(body.pattern_url, None);

        let value = serde_json::to_value(&body).unwrap();
        for field in ["description", "category", "fabric", "fabric_amount", "pattern_url"] {
            assert_eq!(value[field], json!(null), "{field} should be null");
        }
    }

    #[test]
    fn zero_fabric_amount_is_null() {
        let form = PatternForm {
            fabric_amount: "0".to_string(),
            ..tee_shirt()
        };
        assert_eq!(form.to_create().unwrap().fabric_amount, None);

        let form = PatternForm {
            fabric_amount: "1.75".to_string(),
            fabric: "Jersey".to_string(),
            ..tee_shirt()
        };
        let body = form.to_create().unwrap();
        assert_eq!(body.fabric_amount, Some(1.75));
        assert_eq!(body.fabric.as_deref(), Some("Jersey"));
    }

    #[test]
    fn invalid_values_are_rejected() {
        let missing_title = PatternForm {
            title: String::new(),
            ..tee_shirt()
        };
        assert!(matches!(
            missing_title.to_create(),
            Err(AppError::Validation(_))
        ));

        let missing_brand = PatternForm {
            brand: String::new(),
            ..tee_shirt()
        };
        assert!(matches!(
            missing_brand.to_create(),
            Err(AppError::InvalidInput(msg)) if msg == "Brand is required."
        ));

        let bad_amount = PatternForm {
            fabric_amount: "lots".to_string(),
            ..tee_shirt()
        };
        assert!(matches!(bad_amount.to_create(), Err(AppError::InvalidInput(_))));

        let negative = PatternForm {
            fabric_amount: "-2".to_string(),
            ..tee_shirt()
        };
        assert!(matches!(negative.to_create(), Err(AppError::Validation(_))));

        for not_finite in ["inf", "-inf", "NaN", "infinity"] {
            let form = PatternForm {
                fabric_amount: not_finite.to_string(),
                ..tee_shirt()
            };
            assert!(matches!(form.to_create(), Err(AppError::InvalidInput(_))));
            assert!(matches!(form.to_update(), Err(AppError::InvalidInput(_))));
        }

        let bad_category = PatternForm {
            category: "Hats".to_string(),
            ..tee_shirt()
        };
        assert!(bad_category.to_create().is_err());
    }

    #[test]
    fn update_sends_explicit_nulls() {
        let body = tee_shirt().to_update().unwrap();
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["title"], json!("Tee Shirt"));
        assert_eq!(value["category"], json!(null));
        assert_eq!(value["pattern_url"], json!(null));
        assert!(value.as_object().unwrap().contains_key("fabric_amount"));
    }

    #[test]
    fn edit_form_round_trips_stored_pattern() {
        let stored: PatternPublic = serde_json::from_value(json!({
            "id": "6f9619ff-8b86-d011-b42d-00cf4fc964ff",
            "owner_id": "7f9619ff-8b86-d011-b42d-00cf4fc964ff",
            "title": "Wrap Dress",
            "description": "Midi length",
            "brand": "Fibre Mood",
            "version": "Paper",
            "pattern_url": null,
            "for_who": "Women",
            "category": "Dresses",
            "difficulty": 4,
            "fabric": "Viscose",
            "fabric_amount": 2.5
        }))
        .unwrap();
        let form = PatternForm::from_pattern(&stored);
        assert_eq!(form.brand, "Fibre Mood");
        assert_eq!(form.pattern_url, "");

        let update = form.to_update().unwrap();
        assert_eq!(update.description, Some(Some("Midi length".to_string())));
        assert_eq!(update.fabric_amount, Some(Some(2.5)));
        assert_eq!(update.pattern_url, Some(None));
    }

    #[test]
    fn add_pattern_form_reset() {
        let mut form = AddPatternForm::new(tee_shirt(), PatternFiles::default());
        form.reset();
        assert_eq!(form, AddPatternForm::default());
    }

    #[test]
    fn user_forms() {
        let signup = SignUpForm {
            email: "ada@example.com".to_string(),
            full_name: "Ada Lovelace".to_string(),
            password: "analytical".to_string(),
            confirm_password: "analytical".to_string(),
        };
        assert!(signup.to_register().is_ok());

        let mismatch = SignUpForm {
            confirm_password: "engine".to_string(),
            ..signup
        };
        assert!(matches!(
            mismatch.to_register(),
            Err(AppError::InvalidInput(msg)) if msg == PASSWORDS_DO_NOT_MATCH
        ));

        let edit = EditUserForm {
            email: "grace@example.com".to_string(),
            is_active: true,
            ..Default::default()
        };
        let update = edit.to_update().unwrap();
        assert_eq!(update.password, None);
        assert_eq!(update.full_name, None);

        let add = AddUserForm {
            email: "grace@example.com".to_string(),
            password: "cobolcobol".to_string(),
            confirm_password: "cobolcobol".to_string(),
            ..Default::default()
        };
        assert_eq!(add.to_create().unwrap().full_name, None);
    }
}

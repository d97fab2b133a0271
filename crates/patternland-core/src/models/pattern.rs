use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

use super::files::FileSlot;

/// Pattern publisher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Brand {
    #[serde(rename = "Fibre Mood")]
    FibreMood,
    Other,
    Seamwork,
}

impl Brand {
    pub const ALL: [Brand; 3] = [Brand::FibreMood, Brand::Other, Brand::Seamwork];

    pub fn as_str(&self) -> &'static str {
        match self {
            Brand::FibreMood => "Fibre Mood",
            Brand::Other => "Other",
            Brand::Seamwork => "Seamwork",
        }
    }
}

impl Display for Brand {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for Brand {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Fibre Mood" => Ok(Brand::FibreMood),
            "Other" => Ok(Brand::Other),
            "Seamwork" => Ok(Brand::Seamwork),
            _ => Err(anyhow::anyhow!("Invalid brand: {}", s)),
        }
    }
}

/// Paper or digital pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Version {
    Paper,
    Digital,
}

impl Display for Version {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Version::Paper => write!(f, "Paper"),
            Version::Digital => write!(f, "Digital"),
        }
    }
}

impl FromStr for Version {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Paper" => Ok(Version::Paper),
            "Digital" => Ok(Version::Digital),
            _ => Err(anyhow::anyhow!("Invalid version: {}", s)),
        }
    }
}

/// Who the garment is sewn for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ForWho {
    Baby,
    Kids,
    Men,
    Women,
    Pets,
}

impl Display for ForWho {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            ForWho::Baby => write!(f, "Baby"),
            ForWho::Kids => write!(f, "Kids"),
            ForWho::Men => write!(f, "Men"),
            ForWho::Women => write!(f, "Women"),
            ForWho::Pets => write!(f, "Pets"),
        }
    }
}

impl FromStr for ForWho {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Baby" => Ok(ForWho::Baby),
            "Kids" => Ok(ForWho::Kids),
            "Men" => Ok(ForWho::Men),
            "Women" => Ok(ForWho::Women),
            "Pets" => Ok(ForWho::Pets),
            _ => Err(anyhow::anyhow!("Invalid for_who: {}", s)),
        }
    }
}

/// Garment category. A pattern without a category is shown as "Other".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    Accessories,
    Bags,
    Blazers,
    Bodywarmer,
    Cardigans,
    Coats,
    #[serde(rename = "DIY")]
    Diy,
    Dresses,
    Hoodie,
    Jackets,
    Jumpers,
    Jumpsuits,
    Overalls,
    Overshirt,
    Pullovers,
    Shirts,
    Shorts,
    Skirts,
    Sweaters,
    Swimwear,
    #[serde(rename = "T-shirts")]
    TShirts,
    Tops,
    Trousers,
}

impl Category {
    pub const ALL: [Category; 23] = [
        Category::Accessories,
        Category::Bags,
        Category::Blazers,
        Category::Bodywarmer,
        Category::Cardigans,
        Category::Coats,
        Category::Diy,
        Category::Dresses,
        Category::Hoodie,
        Category::Jackets,
        Category::Jumpers,
        Category::Jumpsuits,
        Category::Overalls,
        Category::Overshirt,
        Category::Pullovers,
        Category::Shirts,
        Category::Shorts,
        Category::Skirts,
        Category::Sweaters,
        Category::Swimwear,
        Category::TShirts,
        Category::Tops,
        Category::Trousers,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Accessories => "Accessories",
            Category::Bags => "Bags",
            Category::Blazers => "Blazers",
            Category::Bodywarmer => "Bodywarmer",
            Category::Cardigans => "Cardigans",
            Category::Coats => "Coats",
            Category::Diy => "DIY",
            Category::Dresses => "Dresses",
            Category::Hoodie => "Hoodie",
            Category::Jackets => "Jackets",
            Category::Jumpers => "Jumpers",
            Category::Jumpsuits => "Jumpsuits",
            Category::Overalls => "Overalls",
            Category::Overshirt => "Overshirt",
            Category::Pullovers => "Pullovers",
            Category::Shirts => "Shirts",
            Category::Shorts => "Shorts",
            Category::Skirts => "Skirts",
            Category::Sweaters => "Sweaters",
            Category::Swimwear => "Swimwear",
            Category::TShirts => "T-shirts",
            Category::Tops => "Tops",
            Category::Trousers => "Trousers",
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .iter()
            .copied()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| anyhow::anyhow!("Invalid category: {}", s))
    }
}

/// Request body for `POST /patterns/`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct PatternCreate {
    #[validate(length(min = 1, max = 255, message = "Title is required."))]
    pub title: String,
    #[validate(length(max = 255))]
    pub description: Option<String>,
    pub brand: Brand,
    pub version: Version,
    #[validate(length(max = 255), url(message = "Pattern URL must be a valid URL"))]
    pub pattern_url: Option<String>,
    pub for_who: ForWho,
    pub category: Option<Category>,
    #[validate(range(min = 1, max = 5, message = "Difficulty must be between 1 and 5"))]
    pub difficulty: u8,
    #[validate(length(max = 255))]
    pub fabric: Option<String>,
    #[validate(range(exclusive_min = 0.0, message = "Fabric amount must be positive"))]
    pub fabric_amount: Option<f64>,
}

/// Request body for `PUT /patterns/{id}`
///
/// Fields left `None` are not sent. Clearable fields are tri-state:
/// `Some(None)` is sent as an explicit `null` and clears the stored value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct PatternUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 255, message = "Title is required."))]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 255))]
    pub description: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<Brand>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<Version>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 255), url(message = "Pattern URL must be a valid URL"))]
    pub pattern_url: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub for_who: Option<ForWho>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Option<Category>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, max = 5, message = "Difficulty must be between 1 and 5"))]
    pub difficulty: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 255))]
    pub fabric: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(exclusive_min = 0.0, message = "Fabric amount must be positive"))]
    pub fabric_amount: Option<Option<f64>>,
}

impl PatternUpdate {
    pub fn is_empty(&self) -> bool {
        self == &PatternUpdate::default()
    }
}

/// Pattern as returned by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternPublic {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub brand: Brand,
    pub version: Version,
    pub pattern_url: Option<String>,
    pub for_who: ForWho,
    pub category: Option<Category>,
    pub difficulty: u8,
    pub fabric: Option<String>,
    pub fabric_amount: Option<f64>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub pattern_a0_file_id: Option<String>,
    #[serde(default)]
    pub pattern_a0_sa_file_id: Option<String>,
    #[serde(default)]
    pub pattern_a0_sa_projector_file_id: Option<String>,
    #[serde(default)]
    pub pattern_a0_projector_file_id: Option<String>,
    #[serde(default)]
    pub pattern_a4_file_id: Option<String>,
    #[serde(default)]
    pub pattern_a4_sa_file_id: Option<String>,
    #[serde(default)]
    pub pattern_instructables_file_id: Option<String>,
}

impl PatternPublic {
    /// Stored blob name for a slot, if one was uploaded.
    pub fn file_id(&self, slot: FileSlot) -> Option<&str> {
        let id = match slot {
            FileSlot::Icon => &self.icon,
            FileSlot::A0 => &self.pattern_a0_file_id,
            FileSlot::A0Sa => &self.pattern_a0_sa_file_id,
            FileSlot::A0SaProjector => &self.pattern_a0_sa_projector_file_id,
            FileSlot::A0Projector => &self.pattern_a0_projector_file_id,
            FileSlot::A4 => &self.pattern_a4_file_id,
            FileSlot::A4Sa => &self.pattern_a4_sa_file_id,
            FileSlot::Instructables => &self.pattern_instructables_file_id,
        };
        id.as_deref().filter(|id| !id.is_empty())
    }

    /// True when no slot references a blob.
    pub fn has_no_files(&self) -> bool {
        FileSlot::ALL.iter().all(|slot| self.file_id(*slot).is_none())
    }

    /// Category label used in listings
    pub fn category_label(&self) -> &'static str {
        self.category.map(|c| c.as_str()).unwrap_or("Other")
    }
}

/// Paginated pattern list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternsPublic {
    pub data: Vec<PatternPublic>,
    pub count: u64,
}

/// Optional filters for `GET /patterns/`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PatternFilter {
    pub title: Option<String>,
    pub brand: Option<Brand>,
    pub version: Option<Version>,
    pub for_who: Option<ForWho>,
    pub category: Option<Category>,
    pub difficulty: Option<u8>,
    pub fabric: Option<String>,
    pub fabric_amount: Option<f64>,
    /// Restrict the listing to the caller's own patterns
    pub self_patterns: bool,
}

impl PatternFilter {
    /// Query parameters for the set filters, in a stable order.
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(ref title) = self.title {
            query.push(("title", title.clone()));
        }
        if let Some(brand) = self.brand {
            query.push(("brand", brand.to_string()));
        }
        if let Some(version) = self.version {
            query.push(("version", version.to_string()));
        }
        if let Some(for_who) = self.for_who {
            query.push(("for_who", for_who.to_string()));
        }
        if let Some(category) = self.category {
            query.push(("category", category.to_string()));
        }
        if let Some(difficulty) = self.difficulty {
            query.push(("difficulty", difficulty.to_string()));
        }
        if let Some(ref fabric) = self.fabric {
            query.push(("fabric", fabric.clone()));
        }
        if let Some(amount) = self.fabric_amount {
            query.push(("fabric_amount", amount.to_string()));
        }
        if self.self_patterns {
            query.push(("self_patterns", "true".to_string()));
        }
        query
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_create() -> PatternCreate {
        PatternCreate {
            title: "Tee Shirt".to_string(),
            description: None,
            brand: Brand::Seamwork,
            version: Version::Digital,
            pattern_url: None,
            for_who: ForWho::Women,
            category: Some(Category::TShirts),
            difficulty: 2,
            fabric: None,
            fabric_amount: None,
        }
    }

    #[test]
    fn enum_wire_names() {
        assert_eq!(
            serde_json::to_value(Brand::FibreMood).unwrap(),
            json!("Fibre Mood")
        );
        assert_eq!(serde_json::to_value(Category::Diy).unwrap(), json!("DIY"));
        assert_eq!(
            serde_json::to_value(Category::TShirts).unwrap(),
            json!("T-shirts")
        );
        for category in Category::ALL {
            let parsed: Category = category.as_str().parse().unwrap();
            assert_eq!(parsed, category);
            assert_eq!(
                serde_json::to_value(category).unwrap(),
                json!(category.as_str())
            );
        }
        assert!("Hats".parse::<Category>().is_err());
        assert!("Fibremood".parse::<Brand>().is_err());
    }

    #[test]
    fn create_validation() {
        assert!(sample_create().validate().is_ok());

        let mut empty_title = sample_create();
        empty_title.title = String::new();
        let errors = empty_title.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("title"));

        let mut too_hard = sample_create();
        too_hard.difficulty = 6;
        assert!(too_hard.validate().is_err());

        let mut zero_difficulty = sample_create();
        zero_difficulty.difficulty = 0;
        assert!(zero_difficulty.validate().is_err());

        let mut no_fabric = sample_create();
        no_fabric.fabric_amount = Some(0.0);
        assert!(no_fabric.validate().is_err());

        let mut bad_url = sample_create();
        bad_url.pattern_url = Some("not a url".to_string());
        assert!(bad_url.validate().is_err());

        let mut good_url = sample_create();
        good_url.pattern_url = Some("https://seamwork.com/catalog/tee".to_string());
        good_url.fabric_amount = Some(1.5);
        assert!(good_url.validate().is_ok());
    }

    #[test]
    fn create_serializes_nulls() {
        let value = serde_json::to_value(sample_create()).unwrap();
        assert_eq!(value["title"], json!("Tee Shirt"));
        assert_eq!(value["description"], json!(null));
        assert_eq!(value["pattern_url"], json!(null));
        assert_eq!(value["fabric_amount"], json!(null));
    }

    #[test]
    fn update_tri_state_serialization() {
        let update = PatternUpdate {
            title: Some("Renamed".to_string()),
            category: Some(None),
            fabric_amount: Some(Some(2.0)),
            ..Default::default()
        };
        let value = serde_json::to_value(&update).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), 3);
        assert_eq!(value["title"], json!("Renamed"));
        assert_eq!(value["category"], json!(null));
        assert_eq!(value["fabric_amount"], json!(2.0));
        assert!(!object.contains_key("description"));

        assert!(PatternUpdate::default().is_empty());
        assert!(!update.is_empty());
    }

    #[test]
    fn public_file_ids() {
        let value = json!({
            "id": "6f9619ff-8b86-d011-b42d-00cf4fc964ff",
            "owner_id": "7f9619ff-8b86-d011-b42d-00cf4fc964ff",
            "title": "Tee Shirt",
            "description": null,
            "brand": "Seamwork",
            "version": "Digital",
            "pattern_url": null,
            "for_who": "Women",
            "category": null,
            "difficulty": 2,
            "fabric": null,
            "fabric_amount": null,
            "pattern_a4_file_id": "a4-blob.pdf",
            "icon": ""
        });
        let pattern: PatternPublic = serde_json::from_value(value).unwrap();
        assert_eq!(pattern.file_id(FileSlot::A4), Some("a4-blob.pdf"));
        assert_eq!(pattern.file_id(FileSlot::A0), None);
        assert_eq!(pattern.file_id(FileSlot::Icon), None);
        assert!(!pattern.has_no_files());
        assert_eq!(pattern.category_label(), "Other");
    }

    #[test]
    fn filter_query() {
        let filter = PatternFilter {
            brand: Some(Brand::FibreMood),
            difficulty: Some(3),
            self_patterns: true,
            ..Default::default()
        };
        assert_eq!(
            filter.to_query(),
            vec![
                ("brand", "Fibre Mood".to_string()),
                ("difficulty", "3".to_string()),
                ("self_patterns", "true".to_string()),
            ]
        );
        assert!(PatternFilter::default().to_query().is_empty());
    }
}

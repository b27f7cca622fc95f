//! Per-category rule tables: brand allow-lists, brand rules, key phrases,
//! spec label candidates and valid attribute sizes.

use crate::model::Category;

/// A brand rule keyed by a name token.
#[derive(Clone, Copy)]
pub enum BrandRule {
    /// The token always means this brand.
    Literal(&'static str),
    /// The brand depends on the surrounding tokens.
    Contextual(fn(&[&str]) -> String),
}

impl BrandRule {
    pub fn apply(&self, tokens: &[&str]) -> String {
        match self {
            Self::Literal(brand) => (*brand).to_string(),
            Self::Contextual(rule) => rule(tokens),
        }
    }

    pub fn literal(&self) -> Option<&'static str> {
        match self {
            Self::Literal(brand) => Some(brand),
            Self::Contextual(_) => None,
        }
    }
}

impl std::fmt::Debug for BrandRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Literal(brand) => write!(f, "Literal({brand:?})"),
            Self::Contextual(_) => write!(f, "Contextual(..)"),
        }
    }
}

/// Which extraction algorithm a category uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionFamily {
    /// Model = first five tokens after noise removal; sizes in GB only.
    Phone,
    /// Series-aware model; sizes TB-first.
    Laptop,
}

#[derive(Debug)]
pub struct CategoryRules {
    pub category: Category,
    pub family: ExtractionFamily,
    pub brands: &'static [&'static str],
    pub brand_rules: &'static [(&'static str, BrandRule)],
    pub key_phrases: &'static [&'static str],
    pub ram_labels: &'static [&'static str],
    pub storage_labels: &'static [&'static str],
    pub valid_ram: &'static [u32],
    pub valid_storage: &'static [u32],
    pub detects_storage_type: bool,
}

impl CategoryRules {
    pub fn brand_rule(&self, token: &str) -> Option<&BrandRule> {
        self.brand_rules
            .iter()
            .find(|(key, _)| *key == token)
            .map(|(_, rule)| rule)
    }

    pub fn is_valid_ram(&self, gb: u64) -> bool {
        self.valid_ram.iter().any(|&v| u64::from(v) == gb)
    }

    pub fn is_valid_storage(&self, gb: u64) -> bool {
        self.valid_storage.iter().any(|&v| u64::from(v) == gb)
    }
}

pub fn rules_for(category: Category) -> &'static CategoryRules {
    match category {
        Category::Phone => &PHONE,
        Category::Laptop => &LAPTOP,
        Category::Tablet => &TABLET,
        Category::Monitor => &MONITOR,
        Category::Pc => &PC,
    }
}

/// Spec label holding the manufacturer.
pub const MANUFACTURER_LABEL: &str = "hãng sản xuất";

/// Manufacturer values that mean "no brand".
pub const NO_BRAND_SENTINELS: [&str; 4] = ["hãng khác", "hang khac", "other", "unknown"];

/// A tablet-only keyword that names its maker when it follows a key phrase.
pub const PHRASE_ALIAS: (&str, &str) = ("ipad", "apple");

/// Series keywords per brand for series-aware model extraction.
pub const SERIES: [(&str, &[&str]); 9] = [
    ("macbook", &["air", "pro"]),
    ("dell", &["xps", "inspiron", "latitude", "alienware"]),
    ("hp", &["pavilion", "envy", "spectre", "omen"]),
    ("asus", &["zenbook", "vivobook", "tuf", "rog"]),
    ("acer", &["aspire", "nitro", "swift", "predator"]),
    ("msi", &["modern", "gf", "gl", "katana"]),
    ("lenovo", &["ideapad", "thinkpad", "legion", "yoga"]),
    ("gigabyte", &["aero", "aurus"]),
    ("surface", &["laptop", "pro", "book", "go"]),
];

pub fn series_for(brand: &str) -> &'static [&'static str] {
    SERIES
        .iter()
        .find(|(b, _)| *b == brand)
        .map(|(_, series)| *series)
        .unwrap_or(&[])
}

fn black_shark(tokens: &[&str]) -> String {
    if tokens.get(1) == Some(&"shark") {
        "xiaomi".to_string()
    } else {
        "black".to_string()
    }
}

const PHONE_RAM_LABELS: &[&str] = &["ram", "dung lượng ram"];
const PHONE_STORAGE_LABELS: &[&str] =
    &["rom", "bộ nhớ trong", "dung lượng (rom)", "dung lượng lưu trữ"];
const PHONE_VALID_RAM: &[u32] = &[1, 2, 3, 4, 6, 8, 12, 16, 18, 24];
const PHONE_VALID_STORAGE: &[u32] = &[8, 16, 32, 64, 128, 256, 512, 1024];

const LAPTOP_RAM_LABELS: &[&str] = &["ram", "dung lượng ram", "bộ nhớ ram"];
const LAPTOP_STORAGE_LABELS: &[&str] =
    &["rom", "bộ nhớ trong", "dung lượng lưu trữ", "ổ cứng", "storage"];
const LAPTOP_VALID_RAM: &[u32] = &[2, 4, 6, 8, 12, 16, 20, 24, 32, 64, 128];
const LAPTOP_VALID_STORAGE: &[u32] = &[128, 256, 512, 1024, 2048, 4096];

static PHONE: CategoryRules = CategoryRules {
    category: Category::Phone,
    family: ExtractionFamily::Phone,
    brands: &[
        "apple", "samsung", "xiaomi", "oppo", "realme", "tecno", "vivo", "infinix", "nokia",
        "nubia", "nothing phone", "masstel", "sony", "itel",
    ],
    brand_rules: &[
        ("iphone", BrandRule::Literal("apple")),
        ("redmi", BrandRule::Literal("xiaomi")),
        ("iqoo", BrandRule::Literal("vivo")),
        ("moto", BrandRule::Literal("motorola")),
        ("red", BrandRule::Literal("nubia")),
        ("zenfone", BrandRule::Literal("asus")),
        ("xperia", BrandRule::Literal("sony")),
        ("phillips", BrandRule::Literal("philips")),
        ("black", BrandRule::Contextual(black_shark)),
    ],
    key_phrases: &["điện thoại"],
    ram_labels: PHONE_RAM_LABELS,
    storage_labels: PHONE_STORAGE_LABELS,
    valid_ram: PHONE_VALID_RAM,
    valid_storage: PHONE_VALID_STORAGE,
    detects_storage_type: false,
};

static LAPTOP: CategoryRules = CategoryRules {
    category: Category::Laptop,
    family: ExtractionFamily::Laptop,
    brands: &[
        "asus", "lenovo", "dell", "hp", "acer", "lg", "huawei", "msi", "gigabyte", "vaio",
        "masstel", "apple", "microsoft", "itel", "avita",
    ],
    brand_rules: &[
        ("macbook", BrandRule::Literal("apple")),
        ("mac", BrandRule::Literal("apple")),
        ("probook", BrandRule::Literal("hp")),
    ],
    key_phrases: &["laptop"],
    ram_labels: LAPTOP_RAM_LABELS,
    storage_labels: LAPTOP_STORAGE_LABELS,
    valid_ram: LAPTOP_VALID_RAM,
    valid_storage: LAPTOP_VALID_STORAGE,
    detects_storage_type: true,
};

static TABLET: CategoryRules = CategoryRules {
    category: Category::Tablet,
    family: ExtractionFamily::Laptop,
    brands: &[
        "apple", "samsung", "xiaomi", "huawei", "lenovo", "nokia", "teclast", "kindle", "boox",
        "remarkable",
    ],
    brand_rules: &[("ipad", BrandRule::Literal("apple"))],
    key_phrases: &["máy tính bảng", "máy đọc sách"],
    ram_labels: LAPTOP_RAM_LABELS,
    storage_labels: LAPTOP_STORAGE_LABELS,
    valid_ram: LAPTOP_VALID_RAM,
    valid_storage: LAPTOP_VALID_STORAGE,
    detects_storage_type: false,
};

static MONITOR: CategoryRules = CategoryRules {
    category: Category::Monitor,
    family: ExtractionFamily::Laptop,
    brands: &[
        "asus", "samsung", "dell", "lg", "msi", "acer", "xiaomi", "viewsonic", "philips", "aoc",
        "dahua",
    ],
    brand_rules: &[("e-dra", BrandRule::Literal("edra"))],
    key_phrases: &[
        "màn hình cong gaming",
        "màn hình cong",
        "màn hình lập trình",
        "màn hình gaming",
        "màn hình",
        "giá treo màn hình",
        "giá treo màn hình máy tính",
    ],
    ram_labels: LAPTOP_RAM_LABELS,
    storage_labels: LAPTOP_STORAGE_LABELS,
    valid_ram: LAPTOP_VALID_RAM,
    valid_storage: LAPTOP_VALID_STORAGE,
    detects_storage_type: false,
};

static PC: CategoryRules = CategoryRules {
    category: Category::Pc,
    family: ExtractionFamily::Laptop,
    brands: &["asus", "msi", "singpc"],
    brand_rules: &[
        ("imac", BrandRule::Literal("apple")),
        ("mac", BrandRule::Literal("apple")),
    ],
    key_phrases: &["pc"],
    ram_labels: LAPTOP_RAM_LABELS,
    storage_labels: LAPTOP_STORAGE_LABELS,
    valid_ram: LAPTOP_VALID_RAM,
    valid_storage: LAPTOP_VALID_STORAGE,
    detects_storage_type: true,
};

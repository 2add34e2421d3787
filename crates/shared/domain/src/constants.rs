//! ORM model names, field sets and other shared literals.

pub const WEBSITE_MODEL: &str = "galatea.website";
pub const TEMPLATE_MODEL: &str = "product.template";
pub const PRODUCT_MODEL: &str = "product.product";

/// Fields read for every training (product template).
pub const TRAINING_TEMPLATE_FIELD_NAMES: &[&str] = &[
    "name",
    "esale_slug",
    "esale_shortdescription",
    "esale_price",
    "esale_default_images",
    "esale_all_images",
    "esale_new",
    "esale_hot",
    "esale_metakeyword",
    "training_sessions",
];

/// Fields read for every training session (product variant).
pub const TRAINING_PRODUCT_FIELD_NAMES: &[&str] = &[
    "training_start_date",
    "training_end_date",
    "training_registration",
    "training_place.rec_name",
    "training_seats",
    "training_note",
    "template",
    "add_cart",
];

pub const WEBSITE_FIELD_NAMES: &[&str] =
    &["name", "uri", "metadescription", "metakeywords", "metatitle"];

/// Template field holding the session ids.
pub const SESSIONS_FIELD: &str = "training_sessions";

/// Session key of the visitor's saved catalog filter.
pub const TRAINING_FILTER_KEY: &str = "training_filter";

/// Date format of `/all/{date}` and of normalized ORM dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub const SYSTEM_TAG: &str = "System";
pub const TRAINING_TAG: &str = "Training";

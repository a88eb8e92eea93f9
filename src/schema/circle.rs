//! The circle.yml rule table

use super::{Field, Record, SectionRule, Shape};

/// CircleCI only picks up configuration from a file with this name
pub const REQUIRED_FILENAME: &str = "circle.yml";

// machine
const MACHINE: &[Field] = &[
    // conditions (override is not allowed here)
    Field::optional("pre", Shape::Any),
    Field::optional("post", Shape::Any),
    // languages
    Field::optional("ghc", Shape::Versioned),
    Field::optional("java", Shape::Versioned),
    Field::optional("node", Shape::Versioned),
    Field::optional("php", Shape::Versioned),
    Field::optional("python", Shape::Versioned),
    Field::optional("ruby", Shape::Versioned),
    Field::optional("xcode", Shape::Versioned),
    // system
    Field::optional("environment", Shape::Mapping),
    Field::optional("hosts", Shape::Mapping),
    Field::optional("services", Shape::List),
    Field::optional("timezone", Shape::Str),
];

// checkout
const CHECKOUT: &[Field] = &[Field::optional("post", Shape::List)];

// dependencies
const BUNDLER: &[Field] = &[Field::optional("without", Shape::List)];

const DEPENDENCIES: &[Field] = &[
    Field::optional("pre", Shape::List),
    Field::optional("override", Shape::List),
    Field::optional("post", Shape::List),
    Field::optional("bundler", Shape::Record(Record::closed(BUNDLER))),
    Field::optional("cache_directories", Shape::List),
];

// database
const DATABASE: &[Field] = &[
    Field::optional("pre", Shape::List),
    Field::optional("override", Shape::List),
    Field::optional("post", Shape::List),
];

// test
const TEST: &[Field] = &[
    Field::optional("pre", Shape::List),
    Field::optional("override", Shape::List),
    Field::optional("post", Shape::List),
    Field::optional("minitest_globs", Shape::List),
];

// deployment: target names are chosen by the user
const DEPLOY_TARGET: &[Field] = &[
    Field::required("branch", Shape::StrOrList),
    Field::when_truthy("commands", Shape::List),
    Field::when_truthy("heroku", Shape::Mapping),
    Field::when_truthy("owner", Shape::Str),
    Field::optional("tag", Shape::Any),
];

const DEPLOY_TARGET_SHAPE: &Shape = &Shape::Record(Record::closed(DEPLOY_TARGET));

// notify
const NOTIFY: &[Field] = &[Field::optional("webhooks", Shape::ListOfTruthy("url"))];

// general
const BRANCH_FILTERS: &[Field] = &[
    Field::optional("ignore", Shape::List),
    Field::optional("only", Shape::List),
];

const GENERAL: &[Field] = &[
    Field::optional("artifacts", Shape::List),
    Field::optional("branches", Shape::Record(Record::closed(BRANCH_FILTERS))),
    Field::optional("build_dir", Shape::Str),
];

// experimental
const EXPERIMENTAL_NOTIFY: &[Field] = &[Field::optional(
    "branches",
    Shape::Record(Record::closed(BRANCH_FILTERS)),
)];

const EXPERIMENTAL: &[Field] = &[Field::optional(
    "notify",
    Shape::Record(Record::closed(EXPERIMENTAL_NOTIFY)),
)];

pub static SECTIONS: &[SectionRule] = &[
    SectionRule {
        name: "checkout",
        shape: Shape::Record(Record::closed(CHECKOUT)),
    },
    SectionRule {
        name: "database",
        shape: Shape::Record(Record::closed(DATABASE)),
    },
    SectionRule {
        name: "dependencies",
        shape: Shape::Record(Record::closed(DEPENDENCIES)),
    },
    SectionRule {
        name: "deployment",
        shape: Shape::Record(Record::open(DEPLOY_TARGET_SHAPE)),
    },
    SectionRule {
        name: "experimental",
        shape: Shape::Record(Record::closed(EXPERIMENTAL)),
    },
    SectionRule {
        name: "general",
        shape: Shape::Record(Record::closed(GENERAL)),
    },
    SectionRule {
        name: "machine",
        shape: Shape::Record(Record::closed(MACHINE)),
    },
    SectionRule {
        name: "notify",
        shape: Shape::Record(Record::closed(NOTIFY)),
    },
    SectionRule {
        name: "test",
        shape: Shape::Record(Record::closed(TEST)),
    },
];

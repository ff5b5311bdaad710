use serde::{Deserialize, Serialize};

use super::{DataValidator, Enumeration, GlAccountType, GlAccountUsage, ValidationErrors};

pub const RESOURCE_NAME: &str = "GLAccount";

/// Request parameter names, as they appear in JSON payloads and in errors.
pub mod params {
    pub const ID: &str = "id";
    pub const NAME: &str = "name";
    pub const PARENT_ID: &str = "parentId";
    pub const CURRENCY_CODE: &str = "currencyCode";
    pub const GL_CODE: &str = "glCode";
    pub const DISABLED: &str = "disabled";
    pub const MANUAL_ENTRIES_ALLOWED: &str = "manualEntriesAllowed";
    pub const TYPE: &str = "type";
    pub const USAGE: &str = "usage";
    pub const DESCRIPTION: &str = "description";
    pub const TAG_ID: &str = "tagId";
    pub const AFFECTS_LOAN: &str = "affectsLoan";
}

const NAME_MAX_LENGTH: usize = 200;
const CURRENCY_CODE_MAX_LENGTH: usize = 3;
const GL_CODE_MAX_LENGTH: usize = 45;
const DESCRIPTION_MAX_LENGTH: usize = 500;

/// Immutable command for creating or updating a general ledger account.
///
/// Every field is optional so the same command serves both operations; the
/// create and update validations decide which fields are mandatory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlAccountCommand {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub parent_id: Option<i64>,
    pub currency_code: Option<String>,
    pub gl_code: Option<String>,
    pub disabled: Option<bool>,
    pub manual_entries_allowed: Option<bool>,
    #[serde(rename = "type")]
    pub account_type: Option<i64>,
    pub usage: Option<i64>,
    pub description: Option<String>,
    pub tag_id: Option<i64>,
    pub affects_loan: Option<bool>,
}

impl GlAccountCommand {
    pub fn validate_for_create(&self) -> Result<(), ValidationErrors> {
        let mut v = DataValidator::new(RESOURCE_NAME);

        v.parameter(params::NAME, self.name.as_deref())
            .not_blank()
            .max_length(NAME_MAX_LENGTH);
        v.parameter(params::CURRENCY_CODE, self.currency_code.as_deref())
            .not_blank()
            .max_length(CURRENCY_CODE_MAX_LENGTH);
        v.parameter(params::GL_CODE, self.gl_code.as_deref())
            .not_blank()
            .max_length(GL_CODE_MAX_LENGTH);
        v.parameter(params::PARENT_ID, self.parent_id)
            .ignore_if_absent()
            .greater_than_zero();
        v.parameter(params::TYPE, self.account_type)
            .required()
            .in_range(GlAccountType::min_value(), GlAccountType::max_value());
        v.parameter(params::USAGE, self.usage)
            .in_range(GlAccountUsage::min_value(), GlAccountUsage::max_value());
        v.parameter(params::DESCRIPTION, self.description.as_deref())
            .ignore_if_absent()
            .max_length(DESCRIPTION_MAX_LENGTH);
        v.parameter(params::MANUAL_ENTRIES_ALLOWED, self.manual_entries_allowed)
            .required();
        v.parameter(params::TAG_ID, self.tag_id)
            .ignore_if_absent()
            .greater_than_zero();
        v.parameter(params::AFFECTS_LOAN, self.affects_loan)
            .required();

        v.finish()
    }

    pub fn validate_for_update(&self) -> Result<(), ValidationErrors> {
        let mut v = DataValidator::new(RESOURCE_NAME);

        v.parameter(params::NAME, self.name.as_deref())
            .ignore_if_absent()
            .not_blank()
            .max_length(NAME_MAX_LENGTH);
        v.parameter(params::CURRENCY_CODE, self.currency_code.as_deref())
            .ignore_if_absent()
            .not_blank()
            .max_length(CURRENCY_CODE_MAX_LENGTH);
        v.parameter(params::GL_CODE, self.gl_code.as_deref())
            .ignore_if_absent()
            .not_blank()
            .max_length(GL_CODE_MAX_LENGTH);
        v.parameter(params::PARENT_ID, self.parent_id)
            .ignore_if_absent()
            .greater_than_zero();
        v.parameter(params::TYPE, self.account_type)
            .ignore_if_absent()
            .in_range(GlAccountType::min_value(), GlAccountType::max_value());
        v.parameter(params::USAGE, self.usage)
            .ignore_if_absent()
            .in_range(GlAccountUsage::min_value(), GlAccountUsage::max_value());
        v.parameter(params::DESCRIPTION, self.description.as_deref())
            .ignore_if_absent()
            .not_blank()
            .max_length(DESCRIPTION_MAX_LENGTH);
        v.parameter(params::TAG_ID, self.tag_id)
            .ignore_if_absent()
            .greater_than_zero();

        v.any_of_present(&[
            self.name.is_some(),
            self.currency_code.is_some(),
            self.gl_code.is_some(),
            self.parent_id.is_some(),
            self.account_type.is_some(),
            self.description.is_some(),
            self.disabled.is_some(),
            self.affects_loan.is_some(),
        ]);

        v.finish()
    }

    pub fn is_header_account(&self) -> bool {
        self.usage == Some(GlAccountUsage::Header.id())
    }
}

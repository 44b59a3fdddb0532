//! `Validatable` trait: callers depend on this trait rather than on
//! concrete config types.

use super::error::ConfigResult;

pub trait Validatable {
    fn validate(&self) -> ConfigResult<()>;

    fn config_name(&self) -> &'static str {
        "Config"
    }
}

pub trait ValidatableCollection {
    fn validate_all(&self) -> ConfigResult<()>;
}

impl<T: Validatable> ValidatableCollection for Vec<T> {
    fn validate_all(&self) -> ConfigResult<()> {
        for item in self {
            item.validate()?;
        }
        Ok(())
    }
}

pub(crate) fn check_unit_range(field: &'static str, value: f64) -> ConfigResult<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(super::error::ConfigError::OutOfRange { field, value });
    }
    Ok(())
}

//! 几何计算错误定义
//!
//! 所有变体都属于"定义域错误"：输入违反了几何或数学前提。
//! 计算是纯函数，出错时不返回部分结果，也不重试。

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("Pin count and cam count are both {count}, profile equations divide by zero")]
    EqualToothCounts { count: u32 },

    #[error("Pin count must be at least 3, got {0}")]
    TooFewPins(u32),

    #[error("Resolution must be a positive number of samples per degree, got {0}")]
    InvalidResolution(u32),

    #[error("Degenerate profile: denominator vanishes at psi = {psi}")]
    DegenerateProfile { psi: f64 },

    #[error("Circle pattern count must be at least 1, got {0}")]
    InvalidPatternCount(u32),

    #[error("{name} must be positive, got {value}")]
    NonPositive { name: &'static str, value: f64 },

    #[error("Closed curve needs at least 3 distinct points, got {0}")]
    TooFewPoints(usize),
}

impl GeometryError {
    pub(crate) fn require_positive(name: &'static str, value: f64) -> Result<f64, GeometryError> {
        if value > 0.0 && value.is_finite() {
            Ok(value)
        } else {
            Err(GeometryError::NonPositive { name, value })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_positive() {
        assert_eq!(GeometryError::require_positive("radius", 0.5), Ok(0.5));
        assert_eq!(
            GeometryError::require_positive("radius", 0.0),
            Err(GeometryError::NonPositive { name: "radius", value: 0.0 })
        );
        assert!(GeometryError::require_positive("radius", f64::NAN).is_err());
    }

    #[test]
    fn test_message_names_precondition() {
        let err = GeometryError::EqualToothCounts { count: 12 };
        assert!(err.to_string().contains("12"));
    }
}

use std::fmt::{Display, Formatter};
use std::str::FromStr;
use anyhow::anyhow;

pub mod typed_array;
pub mod ground_truth;

/// Distance functions an external ANN index may be built for.
#[derive(Eq, PartialEq, Hash, Debug, Clone, Copy)]
pub enum Metric {
    Euclidean,
    InnerProduct,
}

impl Display for Metric {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl FromStr for Metric {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Euclidean" | "euclidean" | "L2" | "l2" => Ok(Metric::Euclidean),
            "InnerProduct" | "inner-product" | "ip" | "angular" => Ok(Metric::InnerProduct),
            _ => Err(anyhow!("Metric must be one of [l2|euclidean|ip|inner-product|angular]"))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;
    use crate::Metric;

    #[test]
    fn test_from_str() {
        assert_eq!(Metric::Euclidean, Metric::from_str("l2").unwrap());
        assert_eq!(Metric::Euclidean, Metric::from_str("L2").unwrap());
        assert_eq!(Metric::Euclidean, Metric::from_str("euclidean").unwrap());
        assert_eq!(Metric::InnerProduct, Metric::from_str("angular").unwrap());
        assert_eq!(Metric::InnerProduct, Metric::from_str("ip").unwrap());
        assert_eq!(Metric::InnerProduct, Metric::from_str("InnerProduct").unwrap());
        assert!(Metric::from_str("hamming").is_err());
    }
}

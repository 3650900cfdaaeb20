//! Arithmetic tools: `add`, `multiply`, `power`.

use serde_json::json;

use crate::core::catalog::{Catalog, CatalogError, ParamType, ToolError, ToolSpec, handler};

pub fn register(catalog: &mut Catalog) -> Result<(), CatalogError> {
    catalog.register_tool(
        ToolSpec::new("add", "Adds two numbers together.")
            .required("a", ParamType::Number, "First addend")
            .required("b", ParamType::Number, "Second addend")
            .returns(ParamType::Number),
        handler(|args| {
            let a = args.number("a")?;
            let b = args.number("b")?;
            Ok(json!(a + b))
        }),
    )?;

    catalog.register_tool(
        ToolSpec::new("multiply", "Multiplies two numbers together.")
            .required("a", ParamType::Number, "First factor")
            .required("b", ParamType::Number, "Second factor")
            .returns(ParamType::Number),
        handler(|args| {
            let a = args.number("a")?;
            let b = args.number("b")?;
            Ok(json!(a * b))
        }),
    )?;

    catalog.register_tool(
        ToolSpec::new("power", "Raises a base to an exponent.")
            .required("base", ParamType::Number, "Base value")
            .required("exponent", ParamType::Number, "Exponent value")
            .returns(ParamType::Number),
        handler(|args| {
            let base = args.number("base")?;
            let exponent = args.number("exponent")?;
            let result = base.powf(exponent);
            // powf signals domain errors (negative base with fractional
            // exponent, zero to a negative power) as NaN/infinity.
            if !result.is_finite() {
                return Err(ToolError::Computation(format!(
                    "power is undefined for base {base} and exponent {exponent}"
                )));
            }
            Ok(json!(result))
        }),
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Catalog {
        let mut catalog = Catalog::new();
        register(&mut catalog).unwrap();
        catalog
    }

    #[tokio::test]
    async fn add_sums_its_arguments() {
        let out = catalog().invoke("add", json!({"a": 2, "b": 3})).await.unwrap();
        assert_eq!(out, json!(5.0));
    }

    #[tokio::test]
    async fn add_is_commutative() {
        let c = catalog();
        let ab = c.invoke("add", json!({"a": 1.5, "b": -7})).await.unwrap();
        let ba = c.invoke("add", json!({"a": -7, "b": 1.5})).await.unwrap();
        assert_eq!(ab, ba);
    }

    #[tokio::test]
    async fn multiply_by_zero_is_zero() {
        for a in [-3.5, 0.0, 12.0, 1e9] {
            let out = catalog()
                .invoke("multiply", json!({"a": a, "b": 0}))
                .await
                .unwrap();
            assert_eq!(out, json!(0.0));
        }
    }

    #[tokio::test]
    async fn power_handles_ordinary_cases() {
        let out = catalog()
            .invoke("power", json!({"base": 2, "exponent": 10}))
            .await
            .unwrap();
        assert_eq!(out, json!(1024.0));
    }

    #[tokio::test]
    async fn power_rejects_negative_base_with_fractional_exponent() {
        let err = catalog()
            .invoke("power", json!({"base": -8, "exponent": 0.5}))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "ComputationError");
    }

    #[tokio::test]
    async fn power_rejects_zero_to_a_negative_power() {
        let err = catalog()
            .invoke("power", json!({"base": 0, "exponent": -1}))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "ComputationError");
    }

    #[tokio::test]
    async fn non_numeric_argument_is_a_validation_error() {
        let err = catalog()
            .invoke("add", json!({"a": "one", "b": 2}))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "ValidationError");
    }
}

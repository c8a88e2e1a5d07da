//! Canonical FHIR JSON encoding for document bundles.
//!
//! Encoding is deterministic: struct fields are written in declaration order, absent optional
//! elements are omitted, and the model contains no hash maps. Decoding is strict: unknown
//! bundle-level keys, unknown resource types and wrongly typed fields are all rejected, and the
//! failing JSON path is reported.
//!
//! The assembly engine never depends on this module; it only produces [`Bundle`] values.

use crate::{Bundle, FhirError, FhirResult};

/// Bundle encoding operations.
///
/// This is a zero-sized type used for namespacing codec operations.
/// All methods are associated functions.
pub struct BundleCodec;

impl BundleCodec {
    /// Render a bundle as FHIR JSON text.
    ///
    /// # Arguments
    ///
    /// * `bundle` - The document bundle to encode.
    /// * `pretty` - Whether to indent the output.
    ///
    /// # Errors
    ///
    /// Returns [`FhirError::Translation`] if serialisation fails.
    pub fn encode(bundle: &Bundle, pretty: bool) -> FhirResult<String> {
        let encoded = if pretty {
            serde_json::to_string_pretty(bundle)
        } else {
            serde_json::to_string(bundle)
        };
        encoded.map_err(|e| FhirError::Translation(format!("Failed to serialize bundle: {e}")))
    }

    /// Render a bundle as a JSON value, for embedding in a larger response body.
    ///
    /// # Errors
    ///
    /// Returns [`FhirError::Translation`] if serialisation fails.
    pub fn to_value(bundle: &Bundle) -> FhirResult<serde_json::Value> {
        serde_json::to_value(bundle)
            .map_err(|e| FhirError::Translation(format!("Failed to serialize bundle: {e}")))
    }

    /// Parse a bundle from FHIR JSON text.
    ///
    /// This uses `serde_path_to_error` to surface a best-effort "path" (e.g. `entry[2].resource`)
    /// to the failing field when the JSON does not match the bundle schema.
    ///
    /// # Errors
    ///
    /// Returns [`FhirError::Translation`] if the text is not a valid document bundle, and
    /// [`FhirError::InvalidJson`] if trailing content follows the bundle.
    pub fn decode(text: &str) -> FhirResult<Bundle> {
        let mut deserializer = serde_json::Deserializer::from_str(text);

        let bundle = match serde_path_to_error::deserialize::<_, Bundle>(&mut deserializer) {
            Ok(parsed) => parsed,
            Err(err) => {
                let path = err.path().to_string();
                let source = err.into_inner();
                let path = if path.is_empty() || path == "." {
                    "<root>"
                } else {
                    path.as_str()
                };
                return Err(FhirError::Translation(format!(
                    "Bundle schema mismatch at {path}: {source}"
                )));
            }
        };

        deserializer.end()?;
        Ok(bundle)
    }
}

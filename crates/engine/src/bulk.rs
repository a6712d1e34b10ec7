//! Bulk device creation form.

use simctl_api::ApiError;
use simctl_types::{BulkDeviceRequest, GatewayRecord, Region};

use crate::validation::FormError;

pub const BULK_FAILED_MESSAGE: &str = "Failed to create devices. Please try again.";

#[derive(Debug, Clone, PartialEq, Default)]
pub struct BulkForm {
    /// Raw text of the device count field.
    pub count: String,
    pub name: String,
    /// Name of the selected gateway.
    pub gateway: Option<String>,
    pub region: Option<Region>,
}

impl BulkForm {
    pub fn select_gateway(&mut self, gateway: &GatewayRecord) {
        self.gateway = Some(gateway.name.clone());
    }

    /// Checks count, name, gateway and region in that order and reports the
    /// first problem found.
    pub fn to_request(&self) -> Result<BulkDeviceRequest, FormError> {
        let number_of_devices = self
            .count
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|count| *count > 0)
            .ok_or(FormError::InvalidDeviceCount)?;
        let name = self.name.trim();
        if name.is_empty() {
            return Err(FormError::MissingBulkName);
        }
        let gateway = self
            .gateway
            .as_deref()
            .map(str::trim)
            .filter(|gateway| !gateway.is_empty())
            .ok_or(FormError::MissingGateway)?;
        let region = self.region.ok_or(FormError::MissingRegion)?;
        Ok(BulkDeviceRequest {
            number_of_devices,
            name: name.to_string(),
            gateway: gateway.to_string(),
            region,
        })
    }
}

/// Operator-facing text for a failed bulk request: the backend's own
/// explanation when it sent one.
pub fn failure_message(error: &ApiError) -> String {
    error.detail().unwrap_or(BULK_FAILED_MESSAGE).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checks_run_in_field_order() {
        let mut form = BulkForm {
            count: "0".into(),
            ..Default::default()
        };
        assert_eq!(form.to_request(), Err(FormError::InvalidDeviceCount));
        form.count = "abc".into();
        assert_eq!(form.to_request(), Err(FormError::InvalidDeviceCount));
        form.count = " 25 ".into();
        assert_eq!(form.to_request(), Err(FormError::MissingBulkName));
        form.name = "sensor".into();
        assert_eq!(form.to_request(), Err(FormError::MissingGateway));
        form.select_gateway(&GatewayRecord {
            name: "gw1".into(),
            ..Default::default()
        });
        assert_eq!(form.to_request(), Err(FormError::MissingRegion));
        form.region = Some(Region::Eu868);

        let request = form.to_request().unwrap();
        assert_eq!(request.number_of_devices, 25);
        assert_eq!(request.gateway, "gw1");
        assert_eq!(
            FormError::InvalidDeviceCount.to_string(),
            "Please enter a valid number of devices (greater than 0)."
        );
    }

    #[test]
    fn failure_prefers_backend_detail() {
        let detailed = ApiError::Status {
            status: 409,
            message: "HTTP 409".into(),
            detail: Some("Name prefix already used".into()),
        };
        assert_eq!(failure_message(&detailed), "Name prefix already used");
        assert_eq!(failure_message(&ApiError::MissingUser), BULK_FAILED_MESSAGE);
    }
}

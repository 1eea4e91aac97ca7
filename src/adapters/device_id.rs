//! Device identity for update requests.
//!
//! The id is `OTA-` followed by the last three bytes of the factory MAC in
//! uppercase hex, e.g. `OTA-EFCAFE`. A build can pin a different id with
//! `CELLOTA_DEVICE_ID=...`; the server keys its records on whichever is used.

use core::fmt::Write;

use log::warn;

use crate::ota::messages::DeviceIdentity;

pub type DeviceIdString = heapless::String<16>;

pub type MacAddress = [u8; 6];

const ID_PREFIX: &str = "OTA-";

/// Build-time id override.
const DEVICE_ID_OVERRIDE: Option<&str> = option_env!("CELLOTA_DEVICE_ID");

/// Factory MAC from eFuse, or the ESP-IDF error code.
#[cfg(target_os = "espidf")]
pub fn factory_mac() -> Result<MacAddress, i32> {
    let mut mac: MacAddress = [0u8; 6];
    // SAFETY: the call writes exactly six bytes into `mac`.
    let err = unsafe { esp_idf_svc::sys::esp_efuse_mac_get_default(mac.as_mut_ptr()) };
    if err == esp_idf_svc::sys::ESP_OK {
        Ok(mac)
    } else {
        Err(err)
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn factory_mac() -> Result<MacAddress, i32> {
    Ok([0xDE, 0xAD, 0xBE, 0xEF, 0xCA, 0xFE])
}

pub fn format_id(mac: &MacAddress) -> DeviceIdString {
    let mut id = DeviceIdString::new();
    let [.., a, b, c] = *mac;
    // 10 chars always fit.
    let _ = write!(id, "{ID_PREFIX}{a:02X}{b:02X}{c:02X}");
    id
}

/// Id and firmware version of this board running this build.
pub fn identity() -> DeviceIdentity {
    if let Some(id) = DEVICE_ID_OVERRIDE.filter(|id| !id.trim().is_empty()) {
        return DeviceIdentity::new(id.trim());
    }
    let mac = factory_mac().unwrap_or_else(|e| {
        warn!("eFuse MAC read failed ({}), using zero MAC", e);
        [0u8; 6]
    });
    DeviceIdentity::new(format_id(&mac).as_str())
}

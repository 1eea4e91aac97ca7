//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter        | Implements         | Connects to               |
//! |----------------|--------------------|---------------------------|
//! | `uart`         | SerialLink         | ESP32 UART → SIM7020      |
//! | `time`         | Clock, DelayNs     | esp_timer / FreeRTOS      |
//! | `fs_store`     | ImageStore         | SPIFFS program slots      |
//! | `config_file`  | ConfigPort         | JSON file on SPIFFS       |
//! | `system`       | SystemControl      | esp_restart               |
//! | `log_sink`     | EventSink          | Serial log output         |
//! | `device_id`    | —                  | eFuse MAC → device id     |

pub mod config_file;
pub mod device_id;
pub mod fs_store;
pub mod log_sink;
pub mod system;
pub mod time;
pub mod uart;

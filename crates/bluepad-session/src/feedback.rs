//! Light bar color and low-battery flash.

use bluepad_hid_ds4_protocol::{
    BatteryLevel, CommandBuffer, LOW_BATTERY_FLASH_INTERVAL, LightbarColor,
};

use crate::config::SessionConfig;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeedbackState {
    flashing: bool,
}

impl FeedbackState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_flashing(&self) -> bool {
        self.flashing
    }

    /// Fold the current light bar and battery state into `buffer`.
    ///
    /// Returns `true` if any byte changed and a send is needed.
    pub fn apply(
        &mut self,
        config: &SessionConfig,
        player_slot: Option<u8>,
        battery: BatteryLevel,
        buffer: &mut CommandBuffer,
    ) -> bool {
        if config.lightbar_disabled {
            self.flashing = false;
            let color_changed = buffer.set_lightbar(LightbarColor::OFF);
            let flash_changed = buffer.set_flash(0);
            return color_changed || flash_changed;
        }

        let mut changed = buffer.set_lightbar(LightbarColor::for_player_slot(
            player_slot,
            config.lightbar_brightness,
        ));

        if battery.is_low() {
            if !self.flashing {
                buffer.set_flash(LOW_BATTERY_FLASH_INTERVAL);
                self.flashing = true;
                changed = true;
            }
        } else if self.flashing {
            buffer.set_flash(0);
            self.flashing = false;
            changed = true;
        }

        changed
    }
}

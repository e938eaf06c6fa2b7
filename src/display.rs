//! Terminal presentation of the subscribe link.

use qrcode::{EcLevel, QrCode};
use tracing::warn;

/// One-way sink that shows the subscribe page to the user.
///
/// Rendering is best-effort presentation: it never fails and never
/// blocks the pairing ceremony.
pub trait SubscribeDisplay {
    fn render(&self, url: &str);
}

impl<D: SubscribeDisplay + ?Sized> SubscribeDisplay for &D {
    fn render(&self, url: &str) {
        (**self).render(url);
    }
}

/// Prints the link plus a scannable QR code to the terminal.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalDisplay;

impl SubscribeDisplay for TerminalDisplay {
    fn render(&self, url: &str) {
        println!();
        println!("Scan the QR code with your phone camera or open: {url}");
        println!();

        // Low error correction keeps the code small enough for a terminal.
        let code = match QrCode::with_error_correction_level(url.as_bytes(), EcLevel::L) {
            Ok(code) => code,
            Err(error) => {
                warn!(error = %error, "failed to generate QR code, use the link above");
                return;
            }
        };

        let rendered = code
            .render::<char>()
            .quiet_zone(true)
            .module_dimensions(2, 1)
            .build();

        for line in rendered.lines() {
            println!("  {line}");
        }
    }
}

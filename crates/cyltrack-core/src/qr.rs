// ── QR payloads ──
//
// A cylinder's QR code carries its bare id. Surfaces show the code as an
// image from a QR rendering service, parameterized by payload and size.

use url::Url;

use crate::model::Cylinder;

pub const DEFAULT_QR_BASE: &str = "https://api.qrserver.com/v1/create-qr-code/";
pub const DEFAULT_QR_SIZE: u32 = 250;

/// The string encoded in a cylinder's QR code.
pub fn payload(cylinder: &Cylinder) -> &str {
    &cylinder.id
}

/// Image URL builder for a QR rendering service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrLink {
    base: Url,
    size: u32,
}

impl QrLink {
    pub fn new(base: &str, size: u32) -> Result<Self, url::ParseError> {
        Ok(Self {
            base: Url::parse(base)?,
            size,
        })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    /// `<base>?size=<n>x<n>&data=<payload>&qzone=1`
    pub fn image_url(&self, cylinder: &Cylinder) -> Url {
        self.image_url_for(payload(cylinder))
    }

    pub fn image_url_for(&self, data: &str) -> Url {
        let mut url = self.base.clone();
        url.query_pairs_mut()
            .append_pair("size", &format!("{0}x{0}", self.size))
            .append_pair("data", data)
            .append_pair("qzone", "1");
        url
    }
}

impl Default for QrLink {
    fn default() -> Self {
        Self {
            base: Url::parse(DEFAULT_QR_BASE).expect("default QR service URL is valid"),
            size: DEFAULT_QR_SIZE,
        }
    }
}

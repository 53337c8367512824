/// Largest legacy advertising payload.
pub const MAX_ADV_LEN: usize = 31;

const AD_TYPE_FLAGS: u8 = 0x01;
const AD_TYPE_MANUFACTURER: u8 = 0xFF;
/// LE General Discoverable, BR/EDR not supported.
const FLAGS: u8 = 0x06;

/// Largest frame that fits next to the flags and company id.
pub const MAX_FRAME_IN_ADV: usize = MAX_ADV_LEN - 3 - 4;

/// Payload of the manufacturer-specific AD structure tagged `company`.
pub fn manufacturer_payload(data: &[u8], company: u16) -> Option<&[u8]> {
    let company_le = company.to_le_bytes();

    let mut i = 0;
    while i < data.len() {
        let len = data[i] as usize;
        if len == 0 || i + len >= data.len() {
            break;
        }
        let ad_type = data[i + 1];
        if ad_type == AD_TYPE_MANUFACTURER && len >= 3 && data[i + 2..i + 4] == company_le {
            return Some(&data[i + 4..i + 1 + len]);
        }
        i += len + 1;
    }
    None
}

/// Write flags plus a manufacturer AD carrying `frame` into `buf`.
///
/// Returns the number of bytes written, 0 if `buf` is too small or the
/// frame does not fit in one advertisement.
pub fn build_advertisement(company: u16, frame: &[u8], buf: &mut [u8]) -> usize {
    let total = 3 + 4 + frame.len();
    if frame.len() > MAX_FRAME_IN_ADV || buf.len() < total {
        return 0;
    }

    let [lo, hi] = company.to_le_bytes();
    buf[..7].copy_from_slice(&[
        0x02,
        AD_TYPE_FLAGS,
        FLAGS,
        (3 + frame.len()) as u8,
        AD_TYPE_MANUFACTURER,
        lo,
        hi,
    ]);
    buf[7..total].copy_from_slice(frame);
    total
}

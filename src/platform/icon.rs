pub const ICON_SIZE: u32 = 32;

const BACKGROUND: [u8; 4] = [38, 110, 190, 255];
const LENS: [u8; 4] = [245, 245, 245, 255];

#[cfg(target_os = "windows")]
pub fn create_icon() -> Result<tray_icon::Icon, tray_icon::BadIcon> {
    tray_icon::Icon::from_rgba(paint_icon(ICON_SIZE), ICON_SIZE, ICON_SIZE)
}

/// Rounded square with a lens-shaped disc in the middle, as RGBA rows.
pub fn paint_icon(size: u32) -> Vec<u8> {
    let mut data = vec![0u8; (size * size * 4) as usize];
    let corner = (size / 5) as i32;
    let lens_radius = (size / 4) as i32;
    let center = (size / 2) as i32;

    for y in 0..size as i32 {
        for x in 0..size as i32 {
            if !inside_rounded_square(x, y, size as i32, corner) {
                continue;
            }
            let dx = x - center;
            let dy = y - center;
            let color = if dx * dx + dy * dy <= lens_radius * lens_radius {
                LENS
            } else {
                BACKGROUND
            };
            let idx = ((y as u32 * size + x as u32) * 4) as usize;
            data[idx..idx + 4].copy_from_slice(&color);
        }
    }
    data
}

fn inside_rounded_square(x: i32, y: i32, size: i32, corner: i32) -> bool {
    let cx = x.clamp(corner, size - 1 - corner);
    let cy = y.clamp(corner, size - 1 - corner);
    let dx = x - cx;
    let dy = y - cy;
    dx * dx + dy * dy <= corner * corner
}

use super::*;

fn ramp(w: u32, h: u32) -> RasterImage {
    let mut img = RasterImage::new(w, h);
    for y in 0..h {
        for x in 0..w {
            img.set_pixel(x, y, Rgba8::new(x as u8, y as u8, 0, 255));
        }
    }
    img
}

#[test]
fn new_is_transparent() {
    let img = RasterImage::new(3, 2);
    assert_eq!(img.dimensions(), (3, 2));
    assert_eq!(img.byte_len(), 24);
    assert!(img.as_raw().iter().all(|&b| b == 0));
}

#[test]
fn from_raw_rejects_wrong_length() {
    let err = RasterImage::from_raw(2, 2, vec![0; 15]).unwrap_err();
    assert!(err.to_string().contains("needs 16 bytes"));
    assert!(RasterImage::from_raw(2, 2, vec![0; 16]).is_ok());
}

#[test]
fn pixel_checked_rejects_out_of_bounds() {
    let img = ramp(2, 2);
    assert_eq!(img.pixel_checked(1, 1), Some(Rgba8::new(1, 1, 0, 255)));
    assert_eq!(img.pixel_checked(-1, 0), None);
    assert_eq!(img.pixel_checked(0, 2), None);
}

#[test]
fn region_pads_with_transparent() {
    let img = ramp(4, 4);
    let r = img.region(3, 3, 2, 2);
    assert_eq!(r.pixel(0, 0), Rgba8::new(3, 3, 0, 255));
    assert_eq!(r.pixel(1, 0), Rgba8::TRANSPARENT);
    assert_eq!(r.pixel(0, 1), Rgba8::TRANSPARENT);
}

#[test]
fn flips_mirror_about_own_axis() {
    let mut h = ramp(3, 1);
    h.flip_horizontal();
    assert_eq!(h.pixel(0, 0).r, 2);
    assert_eq!(h.pixel(2, 0).r, 0);

    let mut v = ramp(1, 3);
    v.flip_vertical();
    assert_eq!(v.pixel(0, 0).g, 2);
    assert_eq!(v.pixel(0, 2).g, 0);
}

#[test]
fn fill_sets_every_pixel() {
    let mut img = RasterImage::new(2, 2);
    img.fill(Rgba8::new(1, 2, 3, 4));
    assert_eq!(img, RasterImage::filled(2, 2, Rgba8::new(1, 2, 3, 4)));
}

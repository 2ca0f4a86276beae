use plant_care_common::Coordinates;
use std::io::Cursor;

/// EXIFから読み取ったメタデータ
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExifMeta {
    pub coordinates: Option<Coordinates>,
}

pub fn read_meta(bytes: &[u8]) -> Result<ExifMeta, exif::Error> {
    let mut cursor = Cursor::new(bytes);
    let exif = exif::Reader::new().read_from_container(&mut cursor)?;

    Ok(ExifMeta {
        coordinates: gps_coordinates(&exif),
    })
}

fn gps_coordinates(exif: &exif::Exif) -> Option<Coordinates> {
    let field = |tag| exif.get_field(tag, exif::In::PRIMARY);

    let latitude = dms_to_degrees(field(exif::Tag::GPSLatitude)?)?;
    let longitude = dms_to_degrees(field(exif::Tag::GPSLongitude)?)?;
    let lat_ref = field(exif::Tag::GPSLatitudeRef).and_then(hemisphere).unwrap_or(b'N');
    let lon_ref = field(exif::Tag::GPSLongitudeRef).and_then(hemisphere).unwrap_or(b'E');

    Coordinates::new(
        signed(latitude, lat_ref, b'S'),
        signed(longitude, lon_ref, b'W'),
    )
}

/// 度分秒の Rational x3 を度に変換
fn dms_to_degrees(field: &exif::Field) -> Option<f64> {
    match &field.value {
        exif::Value::Rational(parts) if parts.len() >= 3 => {
            let degrees = parts[0].to_f64();
            let minutes = parts[1].to_f64();
            let seconds = parts[2].to_f64();
            let value = degrees + minutes / 60.0 + seconds / 3600.0;
            value.is_finite().then_some(value)
        }
        _ => None,
    }
}

fn hemisphere(field: &exif::Field) -> Option<u8> {
    match &field.value {
        exif::Value::Ascii(values) => values.first().and_then(|v| v.first().copied()),
        _ => None,
    }
}

fn signed(value: f64, reference: u8, negative: u8) -> f64 {
    if reference.eq_ignore_ascii_case(&negative) {
        -value
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signed_hemisphere() {
        assert_eq!(signed(31.5, b'S', b'S'), -31.5);
        assert_eq!(signed(31.5, b's', b'S'), -31.5);
        assert_eq!(signed(34.8, b'E', b'W'), 34.8);
    }

    #[test]
    fn test_dms_to_degrees() {
        let field = exif::Field {
            tag: exif::Tag::GPSLatitude,
            ifd_num: exif::In::PRIMARY,
            value: exif::Value::Rational(vec![
                exif::Rational { num: 32, denom: 1 },
                exif::Rational { num: 30, denom: 1 },
                exif::Rational { num: 36, denom: 1 },
            ]),
        };
        let degrees = dms_to_degrees(&field).unwrap();
        assert!((degrees - 32.51).abs() < 1e-9);
    }

    #[test]
    fn test_non_exif_bytes() {
        assert!(read_meta(b"not an image").is_err());
    }
}

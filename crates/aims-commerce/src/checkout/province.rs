//! Destination provinces.

use crate::error::CommerceError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Every province and centrally governed city the storefront ships to, by
/// display name.
pub static PROVINCES: [&str; 63] = [
    "An Giang",
    "Bà Rịa - Vũng Tàu",
    "Bắc Giang",
    "Bắc Kạn",
    "Bạc Liêu",
    "Bắc Ninh",
    "Bến Tre",
    "Bình Định",
    "Bình Dương",
    "Bình Phước",
    "Bình Thuận",
    "Cà Mau",
    "Cao Bằng",
    "Đắk Lắk",
    "Đắk Nông",
    "Điện Biên",
    "Đồng Nai",
    "Đồng Tháp",
    "Gia Lai",
    "Hà Giang",
    "Hà Nam",
    "Hà Tĩnh",
    "Hải Dương",
    "Hậu Giang",
    "Hòa Bình",
    "Hưng Yên",
    "Khánh Hòa",
    "Kiên Giang",
    "Kon Tum",
    "Lai Châu",
    "Lâm Đồng",
    "Lạng Sơn",
    "Lào Cai",
    "Long An",
    "Nam Định",
    "Nghệ An",
    "Ninh Bình",
    "Ninh Thuận",
    "Phú Thọ",
    "Quảng Bình",
    "Quảng Nam",
    "Quảng Ngãi",
    "Quảng Ninh",
    "Quảng Trị",
    "Sóc Trăng",
    "Sơn La",
    "Tây Ninh",
    "Thái Bình",
    "Thái Nguyên",
    "Thanh Hóa",
    "Thừa Thiên Huế",
    "Tiền Giang",
    "Trà Vinh",
    "Tuyên Quang",
    "Vĩnh Long",
    "Vĩnh Phúc",
    "Yên Bái",
    "Phú Yên",
    "Cần Thơ",
    "Đà Nẵng",
    "Hải Phòng",
    "Hà Nội",
    "TP Hồ Chí Minh",
];

const METROPOLITAN: [&str; 2] = ["Hà Nội", "TP Hồ Chí Minh"];

/// A known destination province.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Province(&'static str);

impl Province {
    /// Look up a province by its display name.
    pub fn parse(name: &str) -> Result<Self, CommerceError> {
        let name = name.trim();
        PROVINCES
            .iter()
            .find(|p| **p == name)
            .map(|p| Province(*p))
            .ok_or_else(|| CommerceError::UnknownProvince(name.to_string()))
    }

    pub fn name(&self) -> &'static str {
        self.0
    }

    /// Hà Nội and TP Hồ Chí Minh get the larger first weight tier.
    pub fn is_metropolitan(&self) -> bool {
        METROPOLITAN.contains(&self.0)
    }

    pub fn all() -> impl Iterator<Item = Province> {
        PROVINCES.iter().map(|p| Province(*p))
    }
}

impl fmt::Display for Province {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

impl Serialize for Province {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.0)
    }
}

impl<'de> Deserialize<'de> for Province {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Province::parse(&name).map_err(serde::de::Error::custom)
    }
}

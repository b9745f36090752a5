use diesel::deserialize::FromSqlRow;
use diesel::expression::AsExpression;
use diesel::sql_types::Text;
use serde::{Deserialize, Serialize};

/// The category tag of a listing
///
/// Selects which attribute set in [`ListingDetails`] is meaningful.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsExpression, FromSqlRow)]
#[diesel(sql_type = Text)]
pub enum ListingType {
    Apartment,
    Land,
    Field,
    Commercial,
}

text_enum!(ListingType, "listing type" {
    Apartment => "apartment",
    Land => "land",
    Field => "field",
    Commercial => "commercial",
});
text_enum_sql!(ListingType);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Heating {
    Central,
    Individual,
    Underfloor,
    Stove,
    AirConditioning,
    None,
}

text_enum!(Heating, "heating" {
    Central => "central",
    Individual => "individual",
    Underfloor => "underfloor",
    Stove => "stove",
    AirConditioning => "air_conditioning",
    None => "none",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoningStatus {
    Residential,
    Commercial,
    Mixed,
    Agricultural,
    Industrial,
    Tourism,
    Unzoned,
}

text_enum!(ZoningStatus, "zoning status" {
    Residential => "residential",
    Commercial => "commercial",
    Mixed => "mixed",
    Agricultural => "agricultural",
    Industrial => "industrial",
    Tourism => "tourism",
    Unzoned => "unzoned",
});

/// Title deed type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeedStatus {
    Condominium,
    ConstructionServitude,
    SharedTitle,
    DetachedTitle,
}

text_enum!(DeedStatus, "deed status" {
    Condominium => "condominium",
    ConstructionServitude => "construction_servitude",
    SharedTitle => "shared_title",
    DetachedTitle => "detached_title",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommercialUsage {
    Shop,
    Office,
    Warehouse,
    Workshop,
    Restaurant,
    Hotel,
    Building,
}

text_enum!(CommercialUsage, "commercial usage" {
    Shop => "shop",
    Office => "office",
    Warehouse => "warehouse",
    Workshop => "workshop",
    Restaurant => "restaurant",
    Hotel => "hotel",
    Building => "building",
});

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApartmentDetails {
    /// Room layout such as `3+1`
    pub room_count: Option<String>,
    pub bathroom_count: Option<u32>,
    /// Free text, floors like `ground` or `basement` are common
    pub floor: Option<String>,
    pub total_floors: Option<u32>,
    pub building_age: Option<u32>,
    pub heating: Option<Heating>,
    pub furnished: Option<bool>,
    pub balcony: Option<bool>,
    pub elevator: Option<bool>,
    pub parking: Option<bool>,
    pub in_complex: Option<bool>,
    pub monthly_dues: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LandDetails {
    pub zoning_status: Option<ZoningStatus>,
    pub block_number: Option<String>,
    pub parcel_number: Option<String>,
    pub sheet_number: Option<String>,
    pub floor_area_ratio: Option<f64>,
    /// Maximum building height in metres
    pub height_limit: Option<f64>,
    pub deed_status: Option<DeedStatus>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldDetails {
    pub block_number: Option<String>,
    pub parcel_number: Option<String>,
    pub deed_status: Option<DeedStatus>,
    pub water_access: Option<bool>,
    pub electricity: Option<bool>,
    pub road_access: Option<bool>,
    pub soil_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommercialDetails {
    pub usage: Option<CommercialUsage>,
    pub section_count: Option<u32>,
    pub floor: Option<String>,
    pub building_age: Option<u32>,
    pub heating: Option<Heating>,
    pub ceiling_height: Option<f64>,
    pub currently_rented: Option<bool>,
}

/// Category-specific attributes of a listing
///
/// Parsing an attribute object through [`ListingDetails::from_value`]
/// keeps only the fields that belong to the given type; keys of other
/// categories are dropped.
#[derive(Debug, Clone, PartialEq)]
pub enum ListingDetails {
    Apartment(ApartmentDetails),
    Land(LandDetails),
    Field(FieldDetails),
    Commercial(CommercialDetails),
}

impl ListingDetails {
    /// An attribute set with every field unset
    pub fn empty(listing_type: ListingType) -> Self {
        match listing_type {
            ListingType::Apartment => ListingDetails::Apartment(ApartmentDetails::default()),
            ListingType::Land => ListingDetails::Land(LandDetails::default()),
            ListingType::Field => ListingDetails::Field(FieldDetails::default()),
            ListingType::Commercial => ListingDetails::Commercial(CommercialDetails::default()),
        }
    }

    pub fn listing_type(&self) -> ListingType {
        match self {
            ListingDetails::Apartment(_) => ListingType::Apartment,
            ListingDetails::Land(_) => ListingType::Land,
            ListingDetails::Field(_) => ListingType::Field,
            ListingDetails::Commercial(_) => ListingType::Commercial,
        }
    }

    /// Parses an attribute object for the given type
    ///
    /// `null` yields the empty attribute set. Unknown keys are ignored,
    /// known keys with a wrong JSON type are an error.
    pub fn from_value(listing_type: ListingType, value: serde_json::Value) -> Result<Self, serde_json::Error> {
        if value.is_null() {
            return Ok(Self::empty(listing_type));
        }
        let details = match listing_type {
            ListingType::Apartment => ListingDetails::Apartment(serde_json::from_value(value)?),
            ListingType::Land => ListingDetails::Land(serde_json::from_value(value)?),
            ListingType::Field => ListingDetails::Field(serde_json::from_value(value)?),
            ListingType::Commercial => ListingDetails::Commercial(serde_json::from_value(value)?),
        };
        Ok(details)
    }

    /// Serializes the attributes as a JSON object without unset fields
    pub fn to_value(&self) -> serde_json::Value {
        let value = match self {
            ListingDetails::Apartment(d) => serde_json::to_value(d),
            ListingDetails::Land(d) => serde_json::to_value(d),
            ListingDetails::Field(d) => serde_json::to_value(d),
            ListingDetails::Commercial(d) => serde_json::to_value(d),
        };
        match value {
            Ok(serde_json::Value::Object(mut map)) => {
                map.retain(|_, v| !v.is_null());
                serde_json::Value::Object(map)
            }
            // plain structs of options always serialize to an object
            _ => serde_json::Value::Object(serde_json::Map::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_listing_type_parses_case_insensitively() {
        assert_eq!("Apartment".parse::<ListingType>().unwrap(), ListingType::Apartment);
        assert_eq!(" land ".parse::<ListingType>().unwrap(), ListingType::Land);
        assert!("villa".parse::<ListingType>().is_err());
    }

    #[test]
    fn test_listing_type_serde_uses_names() {
        assert_eq!(serde_json::to_value(ListingType::Commercial).unwrap(), json!("commercial"));
        let parsed: ListingType = serde_json::from_value(json!("field")).unwrap();
        assert_eq!(parsed, ListingType::Field);
    }

    #[test]
    fn test_from_value_drops_other_category_fields() {
        let value = json!({
            "room_count": "3+1",
            "heating": "central",
            "zoning_status": "residential",
            "water_access": true
        });
        let details = ListingDetails::from_value(ListingType::Apartment, value).unwrap();
        assert_eq!(
            details.to_value(),
            json!({"room_count": "3+1", "heating": "central"})
        );
    }

    #[test]
    fn test_from_value_null_is_empty() {
        let details = ListingDetails::from_value(ListingType::Land, serde_json::Value::Null).unwrap();
        assert_eq!(details, ListingDetails::empty(ListingType::Land));
        assert_eq!(details.to_value(), json!({}));
    }

    #[test]
    fn test_from_value_rejects_wrong_types() {
        let value = json!({"bathroom_count": "two"});
        assert!(ListingDetails::from_value(ListingType::Apartment, value).is_err());

        let value = json!({"heating": "fireplace"});
        assert!(ListingDetails::from_value(ListingType::Commercial, value).is_err());
    }

    #[test]
    fn test_switching_type_reinterprets_shared_fields() {
        let apartment = json!({"floor": "2", "building_age": 5, "balcony": true});
        let commercial = ListingDetails::from_value(ListingType::Commercial, apartment).unwrap();
        assert_eq!(commercial.listing_type(), ListingType::Commercial);
        assert_eq!(commercial.to_value(), json!({"floor": "2", "building_age": 5}));
    }
}

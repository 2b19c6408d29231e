use crate::osm::mode::FeatureMode;

use geo::Rect;

/// Highway classes the vehicle mode whitelists.
const VEHICLE_CLASSES: &str = "motorway|trunk|primary|secondary|tertiary|unclassified|residential|\
                               pedestrian|motorway_link|trunk_link|primary_link|secondary_link|\
                               tertiary_link|living_street|service|track|bus_guideway|escape|\
                               raceway|road|bridleway|corridor|path";

/// Highway classes the pedestrian mode whitelists; includes `footway`
/// and `steps`, drops the pure-motor classes.
const PEDESTRIAN_CLASSES: &str = "motorway|cycleway|primary|secondary|tertiary|unclassified|\
                                  residential|pedestrian|motorway_link|primary_link|secondary_link|\
                                  tertiary_link|living_street|service|track|bus_guideway|escape|\
                                  road|footway|bridleway|steps|corridor|path";

/// Amenity values the poi mode extracts.
const POI_AMENITIES: &str = "bar|biergarten|cafe|drinking_water|fast_food|ice_cream|food_court|pub|\
                             restaurant|college|driving_school|kindergarten|language_school|library|\
                             music_school|school|sport_school|toy_library|university|bicycle_parking|\
                             bicycle_repair_station|bicycle_rental|boat_rental|boat_sharing|\
                             bus_station|car_rental|car_sharing|car_wash|vehicle_inspection|\
                             charging_station|ferry_terminal|fuel|taxi|atm|bank|bureau_de_change|\
                             baby_hatch|clinic|doctors|dentist|hospital|nursing_home|pharmacy|\
                             social_facility|veterinary|arts_centre|brothel|casino|cinema|\
                             community_centre|gambling|nightclub|planetarium|public_bookcase|\
                             social_centre|stripclub|studio|swingerclub|theatre|animal_boarding|\
                             animal_shelter|conference_centre|courthouse|crematorium|dive_centre|\
                             embassy|fire_station|give_box|internet_cafe|monastery|photo_booth|\
                             place_of_worship|police|post_box|post_depot|post_office|prison|\
                             public_bath|ranger_station|recycling|refugee_site|sanitary_dump_station|\
                             shelter|shower|telephone|toilets|townhall|vending_machine|waste_basket|\
                             waste_disposal|waste_transfer_station|watering_place|water_point";

const OUTPUT_FORMAT: &str = "out geom;(._;>;)";
const AREA_TAG: &str = "area.searchArea";

/// Overpass geographic filter, `(south, west, north, east)` in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl BoundingBox {
    pub fn new(south: f64, west: f64, north: f64, east: f64) -> Self {
        Self {
            south,
            west,
            north,
            east,
        }
    }

    /// From a lon/lat rectangle.
    pub fn from_rect(rect: Rect<f64>) -> Self {
        Self {
            south: rect.min().y,
            west: rect.min().x,
            north: rect.max().y,
            east: rect.max().x,
        }
    }

    /// The filter string Overpass expects inside a statement.
    pub fn filter(&self) -> String {
        format!("{}, {}, {}, {}", self.south, self.west, self.north, self.east)
    }
}

/// Builds the per-mode Overpass query. The `[out:json];` prefix is the
/// client's concern; everything else of the final shape
/// `[out:json];{core};out geom;(._;>;);` comes from here.
#[derive(Debug, Clone, Copy)]
pub struct QueryBuilder {
    mode: FeatureMode,
}

impl QueryBuilder {
    pub fn new(mode: FeatureMode) -> Self {
        Self { mode }
    }

    fn core(&self, geo_filter: &str) -> String {
        match self.mode {
            FeatureMode::Vehicle => format!(
                r#"way["highway"~"^({VEHICLE_CLASSES})$"]["area"!~"."]({geo_filter});"#
            ),
            FeatureMode::Pedestrian => format!(
                r#"way["highway"~"^({PEDESTRIAN_CLASSES})$"]["area"!~"."]({geo_filter});"#
            ),
            FeatureMode::Poi => format!(
                r#"node[~"^(amenity)$"~"({POI_AMENITIES})"]({geo_filter});node[~"^(shop)$"~"."]({geo_filter});"#
            ),
        }
    }

    /// Query anchored to a bounding box.
    pub fn from_bbox(&self, bbox: &BoundingBox) -> String {
        format!("({});{};", self.core(&bbox.filter()), OUTPUT_FORMAT)
    }

    /// Query anchored to a located area (a Nominatim `area_id`).
    pub fn from_area(&self, area_id: u64) -> String {
        format!(
            "area({area_id})->.searchArea;({});{};",
            self.core(AREA_TAG),
            OUTPUT_FORMAT
        )
    }
}

use crate::camera::CameraRecord;
use crate::error::{missing_or_read, Converter};
use crate::Error;
use crate::Result;
use serde_json::Value;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Thumbnail of one source image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Thumb {
    pub url: String,
    pub width: u32,
    pub height: u32,
}

/// Metadata of one coordinate system, without the point cloud data.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CoordSystemInfo {
    /// Number of binary point cloud fragments belonging to the coordinate system.
    pub fragment_count: usize,
    pub cameras: Vec<CameraRecord>,
}

/// Contents of the JSON metadata file of a project.
#[derive(Clone, Debug, PartialEq)]
pub struct Metadata {
    pub version: f64,
    /// One entry per source image, including images the reconstruction dropped.
    pub thumbs: Vec<Thumb>,
    pub coord_systems: Vec<CoordSystemInfo>,
}

impl Metadata {
    /// Parses the JSON metadata.
    ///
    /// The collection is looked up by its GUID.
    /// Older collections store it under an empty key instead.
    pub fn parse(json: &str, guid: &str) -> Result<Self> {
        let document: Value = serde_json::from_str(json).invalid_err("Failed to parse JSON")?;

        let version = req_f64(&document, "_json_synth")?;
        let collections = req(&document, "l")?;
        let root = match collections.get(guid) {
            Some(root) => root,
            None => collections
                .get("")
                .invalid_err(format!("Cannot find collection '{guid}' in JSON metadata"))?,
        };

        let image_count = req_usize(root, "_num_images")?;
        let cs_count = req_usize(root, "_num_coord_systems")?;

        let image_map = req(root, "image_map")?;
        let mut thumbs = Vec::with_capacity(image_count);
        for i in 0..image_count {
            let image = req(image_map, &i.to_string())?;
            thumbs.push(parse_thumb(image)?);
        }

        let systems = req(root, "x")?;
        let mut coord_systems = Vec::with_capacity(cs_count);
        for i in 0..cs_count {
            let system = req(systems, &i.to_string())?;
            coord_systems.push(parse_coord_system(system)?);
        }

        Ok(Self {
            version,
            thumbs,
            coord_systems,
        })
    }

    pub fn from_file(path: impl AsRef<Path>, guid: &str) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| missing_or_read(path, e))?;
        Self::parse(&json, guid)
    }

    pub fn image_count(&self) -> usize {
        self.thumbs.len()
    }
}

/// Reads the collection GUID from the first line of a text file.
/// The GUID is returned in lower case.
pub fn read_guid(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| missing_or_read(path, e))?;
    let mut line = String::new();
    BufReader::new(file)
        .read_line(&mut line)
        .read_err(format!("Failed to read GUID from {}", path.display()))?;
    Ok(line.trim().to_lowercase())
}

fn parse_thumb(image: &Value) -> Result<Thumb> {
    let url = req(image, "u")?
        .as_str()
        .invalid_err("Thumbnail URL is not a string")?
        .to_string();
    let dims = req_array(image, "d")?;
    if dims.len() < 2 {
        Error::invalid("Thumbnail dimensions need a width and a height")?
    }
    let width = to_u32(&dims[0], "thumbnail width")?;
    let height = to_u32(&dims[1], "thumbnail height")?;
    Ok(Thumb { url, width, height })
}

fn parse_coord_system(system: &Value) -> Result<CoordSystemInfo> {
    let k = system.get("k").unwrap_or(&Value::Null);
    if k.is_null() {
        return Ok(CoordSystemInfo::default());
    }

    let fragment_count = k
        .as_array()
        .and_then(|k| k.get(1))
        .and_then(Value::as_u64)
        .invalid_err("Cannot find fragment count in coordinate system")?
        as usize;

    let images = req(system, "r")?
        .as_object()
        .invalid_err("Camera table 'r' is not an object")?;
    let mut cameras = Vec::with_capacity(images.len());
    for j in 0..images.len() {
        let record = images
            .get(&j.to_string())
            .invalid_err(format!("Cannot find camera {j} in coordinate system"))
            .and_then(parse_camera);
        match record {
            Ok(record) => cameras.push(record),
            Err(e) => log::warn!("Skipping camera record {j}: {e}"),
        }
    }

    Ok(CoordSystemInfo {
        fragment_count,
        cameras,
    })
}

fn parse_camera(image: &Value) -> Result<CameraRecord> {
    let j = req_array(image, "j")?;
    if j.len() < 9 {
        Error::invalid(format!(
            "Camera record has {} values instead of 9",
            j.len()
        ))?
    }
    let f = req_array(image, "f")?;
    if f.len() < 2 {
        Error::invalid("Camera record needs two distortion coefficients")?
    }

    let index = j[0]
        .as_u64()
        .invalid_err("Camera image index is not a non-negative integer")? as usize;
    Ok(CameraRecord {
        index,
        x: to_f64(&j[1], "x")?,
        y: to_f64(&j[2], "y")?,
        z: to_f64(&j[3], "z")?,
        qx: to_f64(&j[4], "qx")?,
        qy: to_f64(&j[5], "qy")?,
        qz: to_f64(&j[6], "qz")?,
        ratio: to_f64(&j[7], "ratio")?,
        focal: to_f64(&j[8], "focal")?,
        distort1: to_f64(&f[0], "distort1")?,
        distort2: to_f64(&f[1], "distort2")?,
    })
}

fn req<'a>(value: &'a Value, key: &str) -> Result<&'a Value> {
    value
        .get(key)
        .invalid_err(format!("Cannot find required key '{key}'"))
}

fn req_array<'a>(value: &'a Value, key: &str) -> Result<&'a Vec<Value>> {
    req(value, key)?
        .as_array()
        .invalid_err(format!("Value of '{key}' is not an array"))
}

fn req_f64(value: &Value, key: &str) -> Result<f64> {
    to_f64(req(value, key)?, key)
}

fn req_usize(value: &Value, key: &str) -> Result<usize> {
    let number = req(value, key)?
        .as_u64()
        .invalid_err(format!("Value of '{key}' is not a non-negative integer"))?;
    usize::try_from(number).internal_err(format!("Value of '{key}' does not fit into usize"))
}

fn to_f64(value: &Value, what: &str) -> Result<f64> {
    value
        .as_f64()
        .invalid_err(format!("Value of '{what}' is not a number"))
}

fn to_u32(value: &Value, what: &str) -> Result<u32> {
    value
        .as_u64()
        .and_then(|v| u32::try_from(v).ok())
        .invalid_err(format!("Value of '{what}' is not a valid dimension"))
}

//! A pure Rust library for reading Photosynth project exports.
//!
//! Decodes the binary point cloud fragments and JSON camera metadata of a
//! downloaded project and converts the reconstruction into PLY point clouds,
//! PMVS camera tables and projection files.

#![forbid(unsafe_code)]

mod be_read;
mod be_write;
mod camera;
mod camera_file;
mod clusters;
mod contour;
mod error;
mod export;
mod format;
mod fragment;
mod index;
mod metadata;
mod ply_header;
mod ply_reader;
mod ply_writer;
mod point;
mod pose;
mod project;
mod scene;
mod soap;
mod transform;

pub use self::be_read::BigEndianReader;
pub use self::be_read::VAR_INT_MAX_BYTES;
pub use self::be_write::encode_var_int;
pub use self::be_write::BigEndianWriter;
pub use self::camera::Camera;
pub use self::camera::CameraRecord;
pub use self::camera::ImageSize;
pub use self::camera_file::write_cameras;
pub use self::camera_file::CameraFileOptions;
pub use self::camera_file::ABSENT_ROW;
pub use self::clusters::cluster_ply_name;
pub use self::clusters::ClusterFile;
pub use self::contour::contour_file_name;
pub use self::contour::write_contour;
pub use self::contour::write_contours;
pub use self::contour::CONTOUR_FORMAT;
pub use self::error::Error;
pub use self::error::Result;
pub use self::export::write_indexed_cameras;
pub use self::export::write_indexed_vertices;
pub use self::export::write_points;
pub use self::export::write_points_with_cameras;
pub use self::format::FloatFormat;
pub use self::fragment::Fragment;
pub use self::fragment::MAJOR_VERSION;
pub use self::fragment::MINOR_VERSION;
pub use self::index::decode_index;
pub use self::index::encode_index;
pub use self::index::join_index;
pub use self::index::split_index;
pub use self::index::INDEX_SENTINEL;
pub use self::metadata::read_guid;
pub use self::metadata::CoordSystemInfo;
pub use self::metadata::Metadata;
pub use self::metadata::Thumb;
pub use self::ply_header::PlyFormat;
pub use self::ply_header::PlyHeader;
pub use self::ply_header::MAX_HEADER_LINES;
pub use self::ply_reader::PlyReader;
pub use self::ply_reader::PlyVertex;
pub use self::ply_writer::PlyWriter;
pub use self::ply_writer::PlyWriterOptions;
pub use self::point::pack_rgb565;
pub use self::point::unpack_rgb565;
pub use self::point::Color;
pub use self::point::Vertex;
pub use self::point::VertexInfo;
pub use self::pose::basis_flip;
pub use self::pose::portrait_roll;
pub use self::pose::projection_matrix;
pub use self::pose::Pose;
pub use self::pose::PoseConvention;
pub use self::project::Project;
pub use self::project::ProjectLayout;
pub use self::scene::CoordSystem;
pub use self::scene::Observation;
pub use self::scene::Scene;
pub use self::soap::CollectionInfo;
pub use self::soap::CollectionType;
pub use self::transform::Quaternion;
pub use self::transform::QuaternionPolicy;
pub use self::transform::QUATERNION_TOLERANCE;

//! # VTK export
//!
//! Fields are written as XML `RectilinearGrid` files (`.vtr`) that ParaView and
//! VisIt open directly. 2D fields get a single `z` station at `0`. Undefined
//! nodes are written as `NaN` so that viewers blank them out.
//!
//! ```text
//! <?xml version="1.0" encoding="UTF-8"?>
//! <VTKFile type="RectilinearGrid" version="1.0" byte_order="LittleEndian" header_type="UInt64">
//!     <RectilinearGrid WholeExtent="0 40 0 40 0 0">
//!         <FieldData>
//!             <DataArray type="Float64" Name="TimeStep" NumberOfTuples="1" format="ascii">500</DataArray>
//!             <DataArray type="Float64" Name="Range" NumberOfTuples="2" format="ascii">0 2</DataArray>
//!         </FieldData>
//!         <Piece Extent="0 40 0 40 0 0">
//!             <Coordinates>
//!                 <DataArray type="Float64" NumberOfComponents="1" Name="X" format="ascii">...</DataArray>
//!                 <DataArray type="Float64" NumberOfComponents="1" Name="Y" format="ascii">...</DataArray>
//!                 <DataArray type="Float64" NumberOfComponents="1" Name="Z" format="ascii">0</DataArray>
//!             </Coordinates>
//!             <PointData Scalars="pressure">
//!                 <DataArray type="Float64" NumberOfComponents="1" Name="pressure" format="ascii">...</DataArray>
//!             </PointData>
//!         </Piece>
//!     </RectilinearGrid>
//! </VTKFile>
//! ```

use crate::config::ExportConfig;
use crate::prelude::*;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use serde::{Deserialize, Serialize};

/// the encoding to use when writing an inline dataarray
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    #[default]
    Ascii,
    Base64,
}

impl Encoding {
    fn to_str(&self) -> &'static str {
        match &self {
            Self::Ascii => "ascii",
            Self::Base64 => "binary",
        }
    }
}

/// floating point precision of the written arrays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Precision {
    Float32,
    #[default]
    Float64,
}

impl Precision {
    fn to_str(&self) -> &'static str {
        match &self {
            Self::Float32 => "Float32",
            Self::Float64 => "Float64",
        }
    }
}

/// Write `field` as a VTK `RectilinearGrid` to `writer`, with values converted to `N`
///
/// `range` is stored in the `FieldData` section when present.
pub fn write_vtk<W: Write, N: Numeric>(
    writer: W,
    field: &Field,
    range: Option<FieldRange>,
    encoding: Encoding,
) -> Result<(), Error> {
    let mut writer = Writer::new_with_indent(writer, b' ', 4);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let vtk_file = BytesStart::new("VTKFile").with_attributes([
        ("type", "RectilinearGrid"),
        ("version", "1.0"),
        ("byte_order", "LittleEndian"),
        ("header_type", "UInt64"),
    ]);
    writer.write_event(Event::Start(vtk_file))?;

    let extent = extent_string(field.mesh());

    let grid =
        BytesStart::new("RectilinearGrid").with_attributes([("WholeExtent", extent.as_str())]);
    writer.write_event(Event::Start(grid))?;

    write_field_data(&mut writer, field.time_step(), range)?;

    let piece = BytesStart::new("Piece").with_attributes([("Extent", extent.as_str())]);
    writer.write_event(Event::Start(piece))?;

    writer.write_event(Event::Start(BytesStart::new("Coordinates")))?;

    let z = field.z().map(<[f64]>::to_vec).unwrap_or_else(|| vec![0.0]);
    let coordinates: [(&str, &[f64]); 3] = [("X", field.x()), ("Y", field.y()), ("Z", &z)];

    for (name, stations) in coordinates {
        let stations: Vec<N> = stations.iter().map(|s| N::from_f64(*s)).collect();
        write_inline_dataarray(&mut writer, &stations, name, encoding)?;
    }

    writer.write_event(Event::End(BytesEnd::new("Coordinates")))?;

    let point_data = BytesStart::new("PointData").with_attributes([("Scalars", field.label())]);
    writer.write_event(Event::Start(point_data))?;

    // row-major with x fastest is exactly the VTK point ordering
    let values: Vec<N> = field
        .iter()
        .map(|value| N::from_f64(value.unwrap_or(f64::NAN)))
        .collect();
    write_inline_dataarray(&mut writer, &values, field.label(), encoding)?;

    writer.write_event(Event::End(BytesEnd::new("PointData")))?;
    writer.write_event(Event::End(BytesEnd::new("Piece")))?;
    writer.write_event(Event::End(BytesEnd::new("RectilinearGrid")))?;
    writer.write_event(Event::End(BytesEnd::new("VTKFile")))?;

    Ok(())
}

/// `"0 nx-1 0 ny-1 0 nz-1"`
fn extent_string(mesh: &Mesh) -> String {
    let last = |stations: &[f64]| stations.len().saturating_sub(1);
    let nz = mesh.z_locations.as_deref().map(last).unwrap_or(0);

    format!(
        "0 {} 0 {} 0 {}",
        last(&mesh.x_locations),
        last(&mesh.y_locations),
        nz
    )
}

fn write_field_data<W: Write>(
    writer: &mut Writer<W>,
    time_step: u32,
    range: Option<FieldRange>,
) -> Result<(), Error> {
    writer.write_event(Event::Start(BytesStart::new("FieldData")))?;

    let time_step = time_step.to_string();
    write_field_data_array(writer, "TimeStep", 1, &time_step)?;

    if let Some(range) = range {
        let text = format!("{} {}", format_ascii(range.min), format_ascii(range.max));
        write_field_data_array(writer, "Range", 2, &text)?;
    }

    writer.write_event(Event::End(BytesEnd::new("FieldData")))?;

    Ok(())
}

fn write_field_data_array<W: Write>(
    writer: &mut Writer<W>,
    name: &str,
    tuples: usize,
    text: &str,
) -> Result<(), Error> {
    let tuples = tuples.to_string();
    let header = BytesStart::new("DataArray").with_attributes([
        ("type", "Float64"),
        ("Name", name),
        ("NumberOfTuples", tuples.as_str()),
        ("format", "ascii"),
    ]);

    writer.write_event(Event::Start(header))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new("DataArray")))?;

    Ok(())
}

pub fn write_inline_array_header<W: Write>(
    writer: &mut Writer<W>,
    format: Encoding,
    name: &str,
    components: usize,
    precision: Precision,
) -> Result<(), Error> {
    let components = components.to_string();
    let header = BytesStart::new("DataArray").with_attributes([
        ("type", precision.to_str()),
        ("NumberOfComponents", components.as_str()),
        ("Name", name),
        ("format", format.to_str()),
    ]);
    writer.write_event(Event::Start(header))?;

    Ok(())
}

pub fn close_inline_array_header<W: Write>(writer: &mut Writer<W>) -> Result<(), Error> {
    writer.write_event(Event::End(BytesEnd::new("DataArray")))?;

    Ok(())
}

/// write a single (inline) array of data (such as x-velocity)
/// to the vtk file.
pub fn write_inline_dataarray<W: Write, N: Numeric>(
    writer: &mut Writer<W>,
    data: &[N],
    name: &str,
    encoding: Encoding,
) -> Result<(), Error> {
    write_inline_array_header(writer, encoding, name, 1, N::as_precision())?;

    let text = match encoding {
        Encoding::Ascii => data
            .iter()
            .map(|x| format_ascii(*x))
            .collect::<Vec<_>>()
            .join(" "),
        Encoding::Base64 => {
            let mut byte_data: Vec<u8> = Vec::with_capacity(8 + data.len() * N::SIZE);

            // inline binary arrays start with the number of data bytes (`header_type`)
            let num_bytes = (data.len() * N::SIZE) as u64;
            byte_data.extend_from_slice(&num_bytes.to_le_bytes());

            data.iter()
                .for_each(|float| float.extend_le_bytes(&mut byte_data));

            base64::encode(byte_data.as_slice())
        }
    };

    writer.write_event(Event::Text(BytesText::new(&text)))?;

    close_inline_array_header(writer)?;

    Ok(())
}

/// shortest round-tripping representation, `NaN` for undefined nodes
fn format_ascii<N: Numeric>(value: N) -> String {
    let mut buffer = ryu::Buffer::new();
    buffer.format(value).to_string()
}

/// [`FieldSink`] writing one `.vtr` file per field into a directory
#[derive(Debug, Clone)]
pub struct VtkWriter {
    directory: PathBuf,
    encoding: Encoding,
    precision: Precision,
}

impl VtkWriter {
    pub fn new<P: Into<PathBuf>>(directory: P, encoding: Encoding, precision: Precision) -> Self {
        Self {
            directory: directory.into(),
            encoding,
            precision,
        }
    }

    pub fn from_config(config: &ExportConfig) -> Self {
        Self::new(&config.directory, config.encoding, config.precision)
    }

    /// `<directory>/<label>_<time-step:07>.vtr`
    pub fn path_for(&self, field: &Field) -> PathBuf {
        self.directory
            .join(format!("{}_{:07}.vtr", field.label(), field.time_step()))
    }
}

impl FieldSink for VtkWriter {
    fn write_field(&mut self, field: &Field, range: Option<FieldRange>) -> Result<PathBuf, Error> {
        std::fs::create_dir_all(&self.directory)?;

        let path = self.path_for(field);
        let file = std::io::BufWriter::new(std::fs::File::create(&path)?);

        match self.precision {
            Precision::Float32 => write_vtk::<_, f32>(file, field, range, self.encoding)?,
            Precision::Float64 => write_vtk::<_, f64>(file, field, range, self.encoding)?,
        }

        log::info!("wrote {} to {}", field.label(), path.display());

        Ok(path)
    }
}

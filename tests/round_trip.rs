//! Writes records to real files and reads them back through the path based
//! functions.

use std::fs;

use cgmath::{Point2, Point3, Vector3};
use tempfile::TempDir;

use plyvert::{
    prelude::*,
    Color2dVertex, ColorVertex, Grid, OrientedColorVertex, OrientedVertex, Point2dVertex,
    PointVertex, TriangleIndex, ValueVertex,
    io::{
        Error,
        ply::{self, Config, Format},
    },
};


const FORMATS: [Format; 3] = [
    Format::Ascii,
    Format::BinaryLittleEndian,
    Format::BinaryBigEndian,
];

/// Writes `vertices` with triangles in all three formats and checks that
/// reading them back yields the same records.
fn check_round_trip<V: Vertex>(vertices: &[V]) -> Result<(), Error> {
    let dir = TempDir::new()?;
    let triangles = [TriangleIndex([0, 1, 2]), TriangleIndex([2, 1, 0])];

    for &format in &FORMATS {
        let path = dir.path().join(format!("{:?}.ply", format));
        let config = Config::new(format).add_comment("round trip");
        ply::write_triangles(&path, vertices, V::write_properties(), &triangles, config)?;

        let data = ply::read_triangles::<V>(&path, V::read_properties())?;
        assert_eq!(data.vertices, vertices, "{:?}", format);
        assert_eq!(data.topology, triangles, "{:?}", format);
        assert_eq!(data.format, format);
        assert_eq!(data.comments, vec!["round trip"]);
        assert!(data.present.iter().all(|p| p.is_present() || p.name.starts_with("diffuse_")));
    }

    Ok(())
}

#[test]
fn points() -> Result<(), Error> {
    check_round_trip(&[
        PointVertex::from_position(Point3::new(0.0f32, 0.0, 0.0)),
        PointVertex::from_position(Point3::new(1.942, 152.99, 0.007)),
        PointVertex::from_position(Point3::new(-1e-30, 3.4e38, f32::MIN_POSITIVE)),
    ])?;
    check_round_trip(&[
        PointVertex::from_position(Point3::new(0.1f64, 0.2, 0.3)),
        PointVertex::from_position(Point3::new(1.0 / 3.0, -2.0 / 3.0, 1e300)),
        PointVertex::from_position(Point3::new(5e-324, 0.0, -0.5)),
    ])
}

#[test]
fn points_2d() -> Result<(), Error> {
    check_round_trip(&[
        Point2dVertex::from_position(Point2::new(0.5f32, 1.5)),
        Point2dVertex::from_position(Point2::new(-3.25, 0.1)),
        Point2dVertex::from_position(Point2::new(1e7, 1e-7)),
    ])
}

#[test]
fn values() -> Result<(), Error> {
    check_round_trip(&[
        ValueVertex::new(Point3::new(0.0f64, 1.0, 2.0), 0.125),
        ValueVertex::new(Point3::new(3.0, 4.0, 5.0), -17.75),
        ValueVertex::new(Point3::new(6.0, 7.0, 8.0), 0.1),
    ])
}

#[test]
fn normals() -> Result<(), Error> {
    check_round_trip(&[
        OrientedVertex::new(Point3::new(0.0f32, 0.0, 0.0), Vector3::new(0.0, 0.0, 1.0)),
        OrientedVertex::new(Point3::new(1.0, 0.0, 0.0), Vector3::new(0.6, 0.8, 0.0)),
        OrientedVertex::new(Point3::new(0.0, 1.0, 0.0), Vector3::new(-0.1, 0.2, -0.3)),
    ])
}

#[test]
fn colors() -> Result<(), Error> {
    check_round_trip(&[
        ColorVertex::new(Point3::new(0.0f32, 0.0, 0.0), Vector3::new(0.0, 0.0, 0.0)),
        ColorVertex::new(Point3::new(1.0, 0.0, 0.0), Vector3::new(255.0, 128.0, 1.0)),
        ColorVertex::new(Point3::new(0.0, 1.0, 0.0), Vector3::new(17.0, 254.0, 99.0)),
    ])?;
    check_round_trip(&[
        Color2dVertex::new(Point2::new(0.0f64, 0.0), Vector3::new(255.0, 255.0, 255.0)),
        Color2dVertex::new(Point2::new(1.0, 0.0), Vector3::new(3.0, 2.0, 1.0)),
        Color2dVertex::new(Point2::new(0.0, 1.0), Vector3::new(200.0, 100.0, 50.0)),
    ])?;
    check_round_trip(&[
        OrientedColorVertex::new(
            Point3::new(0.0f64, 0.0, 0.0),
            Vector3::new(0.0, 0.0, 1.0),
            Vector3::new(10.0, 20.0, 30.0),
        ),
        OrientedColorVertex::new(
            Point3::new(1.0, 0.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
            Vector3::new(255.0, 0.0, 255.0),
        ),
        OrientedColorVertex::new(
            Point3::new(0.0, 1.0, 0.0),
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(0.0, 0.0, 0.0),
        ),
    ])
}

#[test]
fn all_color_values_are_exact() -> Result<(), Error> {
    let dir = TempDir::new()?;
    let vertices = (0..=255)
        .map(|c| {
            let c = c as f32;
            ColorVertex::new(Point3::new(c, 0.0, 0.0), Vector3::new(c, 255.0 - c, c))
        })
        .collect::<Vec<_>>();

    let path = dir.path().join("colors.ply");
    ply::write_points(&path, &vertices, ColorVertex::<f32>::write_properties(), Config::binary())?;

    // Three floats and three bytes per vertex
    let file = fs::read(&path)?;
    let end = b"end_header\n";
    let body_start = file.windows(end.len()).position(|w| w == end).unwrap() + end.len();
    assert_eq!(file.len() - body_start, 256 * 15);

    let data = ply::read_points::<ColorVertex<f32>>(&path, ColorVertex::<f32>::read_properties())?;
    assert_eq!(data.vertices, vertices);
    Ok(())
}

#[test]
fn polygons() -> Result<(), Error> {
    let dir = TempDir::new()?;
    let vertices = (0..6)
        .map(|i| PointVertex::from_position(Point3::new(i as f64, (i * i) as f64, 0.0)))
        .collect::<Vec<_>>();
    let polygons = vec![vec![0, 1, 2, 3], vec![3, 4, 5], vec![0, 2, 4, 5, 1]];

    for &format in &FORMATS {
        let path = dir.path().join("polygons.ply");
        let props = PointVertex::<f64>::write_properties();
        ply::write_polygons(&path, &vertices, props, &polygons, Config::new(format))?;

        let data = ply::read_polygons::<PointVertex<f64>>(&path, PointVertex::<f64>::read_properties())?;
        assert_eq!(data.vertices, vertices);
        assert_eq!(data.topology, polygons);

        // Polygons are fine for points, but not for triangles
        assert_eq!(ply::read_points::<PointVertex<f64>>(&path, props)?.vertices, vertices);
        match ply::read_triangles::<PointVertex<f64>>(&path, props) {
            Err(Error::NonTriangularFace { face: 0, len: 4 }) => {}
            other => panic!("unexpected result: {:?}", other),
        }
    }

    Ok(())
}

#[test]
fn grid() -> Result<(), Error> {
    let dir = TempDir::new()?;
    let vertices = (0..5)
        .map(|i| ValueVertex::new(Point3::new(i as f32, 0.0, 0.0), i as f32 * 0.5))
        .collect::<Vec<_>>();
    let grid = Grid::from_vec(3, 2, vec![0, 1, 2, -1, 3, 4]);

    for &format in &FORMATS {
        let path = dir.path().join("grid.ply");
        let config = Config::new(format).add_obj_info("num_cols 3").add_obj_info("num_rows 2");
        ply::write_grid(&path, &vertices, ValueVertex::<f32>::write_properties(), &grid, config)?;

        let data = ply::read_grid::<ValueVertex<f32>>(&path, ValueVertex::<f32>::read_properties())?;
        assert_eq!(data.vertices, vertices);
        assert_eq!(data.topology, grid);
        assert_eq!(data.obj_info, vec!["num_cols 3", "num_rows 2"]);
    }

    Ok(())
}

#[test]
fn read_with_other_record_type() -> Result<(), Error> {
    let dir = TempDir::new()?;
    let path = dir.path().join("full.ply");
    let vertices = [
        OrientedColorVertex::new(
            Point3::new(1.0f32, 2.0, 3.0),
            Vector3::new(0.0, 1.0, 0.0),
            Vector3::new(9.0, 8.0, 7.0),
        ),
    ];
    let props = OrientedColorVertex::<f32>::write_properties();
    ply::write_points(&path, &vertices, props, Config::ascii())?;

    // Fewer properties and a different precision
    let data = ply::read_points::<ColorVertex<f64>>(&path, ColorVertex::<f64>::read_properties())?;
    assert_eq!(data.vertices, vec![
        ColorVertex::new(Point3::new(1.0, 2.0, 3.0), Vector3::new(9.0, 8.0, 7.0)),
    ]);

    // More properties than the file has
    let text = fs::read_to_string(&path)?;
    let stripped = text.replace("property float nx\n", "")
        .replace("property float ny\n", "")
        .replace("property float nz\n", "")
        .replace("1 2 3 0 1 0 9 8 7", "1 2 3 9 8 7");
    fs::write(&path, stripped)?;

    let data = ply::read_points::<OrientedColorVertex<f32>>(
        &path,
        OrientedColorVertex::<f32>::read_properties(),
    )?;
    assert_eq!(data.vertices[0].normal, Vector3::new(0.0, 0.0, 0.0));
    assert_eq!(data.vertices[0].color, Vector3::new(9.0, 8.0, 7.0));
    assert!(!data.present.is_present("nx"));
    assert!(data.present.is_present("red"));

    Ok(())
}

#[test]
fn config_round_trip() -> Result<(), Error> {
    let dir = TempDir::new()?;
    let path = dir.path().join("config.ply");
    let config = Config::new(Format::BinaryBigEndian)
        .add_comment("  indented comment")
        .add_comment("")
        .add_obj_info("some info");

    let vertices = [PointVertex::from_position(Point3::new(1.0f32, 1.0, 1.0))];
    ply::write_points(&path, &vertices, PointVertex::<f32>::write_properties(), config.clone())?;

    let data = ply::read_points::<PointVertex<f32>>(&path, PointVertex::<f32>::read_properties())?;
    assert_eq!(data.config(), config);
    Ok(())
}

#[test]
fn missing_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("does_not_exist.ply");

    match ply::read_points::<PointVertex<f32>>(&path, PointVertex::<f32>::read_properties()) {
        Err(Error::FileOpen { path: p, .. }) => assert!(p.ends_with("does_not_exist.ply")),
        other => panic!("unexpected result: {:?}", other),
    }

    let bad_path = dir.path().join("no_dir").join("out.ply");
    let empty: &[PointVertex<f32>] = &[];
    let props = PointVertex::<f32>::write_properties();
    let res = ply::write_points(&bad_path, empty, props, Config::ascii());
    match res {
        Err(Error::FileOpen { .. }) => {}
        other => panic!("unexpected result: {:?}", other),
    }
}

use approx::assert_relative_eq;
use geo::{algorithm::area::Area, Geometry, Polygon};
use geo_overlay::{
    disjoint, equals, intersects, is_simple, overlaps, overlay, relate, touches, BooleanOps,
    Location, OpType, OverlayError,
};
use wkt::TryFromWkt;

fn init_log() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn geom(wkt: &str) -> Geometry<f64> {
    Geometry::try_from_wkt_str(wkt).unwrap()
}

const A: &str = "POLYGON((0 0,10 0,10 10,0 10,0 0))";
const B: &str = "POLYGON((5 5,15 5,15 15,5 15,5 5))";

const INPUTS: &[&str] = &[
    A,
    B,
    "POLYGON((10 0,20 0,20 10,10 10,10 0))",
    "POLYGON((2 2,8 2,8 8,2 8,2 2))",
    "POLYGON((-5 -5,25 -5,25 25,-5 25,-5 -5),(0 0,0 20,20 20,20 0,0 0))",
    "MULTIPOLYGON(((0 0,4 0,4 4,0 4,0 0)),((6 6,12 6,12 12,6 12,6 6)))",
    "POLYGON((3 -2,7 -2,7 12,3 12,3 -2))",
];

#[test]
fn overlapping_squares() -> anyhow::Result<()> {
    init_log();
    let (a, b) = (geom(A), geom(B));

    let inter = overlay(&a, &b, OpType::Intersection)?;
    assert!(equals(&inter, &geom("POLYGON((5 5,10 5,10 10,5 10,5 5))"))?);
    assert_relative_eq!(overlay(&a, &b, OpType::Union)?.unsigned_area(), 175.);
    assert_relative_eq!(overlay(&a, &b, OpType::Difference)?.unsigned_area(), 75.);
    Ok(())
}

#[test]
fn squares_sharing_an_edge() -> anyhow::Result<()> {
    init_log();
    let a = geom(A);
    let b = geom("POLYGON((10 0,20 0,20 10,10 10,10 0))");
    assert!(touches(&a, &b)?);
    assert!(!overlaps(&a, &b)?);
    assert!(intersects(&a, &b)?);

    let im = relate(&a, &b)?;
    assert_eq!(
        im.get(Location::Boundary, Location::Boundary),
        geo_overlay::Dimension::OneDimensional
    );
    Ok(())
}

#[test]
fn bowtie_is_not_simple() -> anyhow::Result<()> {
    assert!(!is_simple(&geom("POLYGON((0 0,10 10,10 0,0 10,0 0))"))?);
    assert!(!is_simple(&geom("LINESTRING(0 0,10 10,10 0,0 10,0 0)"))?);
    Ok(())
}

#[test]
fn area_identity() -> anyhow::Result<()> {
    init_log();
    for wkt1 in INPUTS {
        for wkt2 in INPUTS {
            let (a, b) = (geom(wkt1), geom(wkt2));
            let union = overlay(&a, &b, OpType::Union)?;
            let inter = overlay(&a, &b, OpType::Intersection)?;
            assert_relative_eq!(
                union.unsigned_area() + inter.unsigned_area(),
                a.unsigned_area() + b.unsigned_area(),
                epsilon = 1e-9
            );
        }
    }
    Ok(())
}

#[test]
fn idempotence() -> anyhow::Result<()> {
    init_log();
    for wkt in INPUTS {
        let a = geom(wkt);
        assert!(equals(&overlay(&a, &a, OpType::Union)?, &a)?, "union({wkt})");
        assert!(equals(&overlay(&a, &a, OpType::Intersection)?, &a)?, "intersection({wkt})");
    }
    Ok(())
}

#[test]
fn commutativity() -> anyhow::Result<()> {
    init_log();
    for (i, wkt1) in INPUTS.iter().enumerate() {
        for wkt2 in &INPUTS[i + 1..] {
            let (a, b) = (geom(wkt1), geom(wkt2));
            for op in [OpType::Intersection, OpType::Union, OpType::SymDifference] {
                let ab = overlay(&a, &b, op)?;
                let ba = overlay(&b, &a, op)?;
                assert!(equals(&ab, &ba)?, "{op:?}({wkt1}, {wkt2})");
            }
        }
    }

    let (a, b) = (geom(A), geom(B));
    let ab = overlay(&a, &b, OpType::Difference)?;
    let ba = overlay(&b, &a, OpType::Difference)?;
    assert!(!equals(&ab, &ba)?);
    Ok(())
}

#[test]
fn complement_law() -> anyhow::Result<()> {
    init_log();
    for wkt1 in INPUTS {
        for wkt2 in INPUTS {
            let (a, b) = (geom(wkt1), geom(wkt2));
            let diff = overlay(&a, &b, OpType::Difference)?;
            let inter = overlay(&a, &b, OpType::Intersection)?;
            let whole = overlay(&diff, &inter, OpType::Union)?;
            assert!(equals(&whole, &a)?, "complement of {wkt2} in {wkt1}");
        }
    }
    Ok(())
}

#[test]
fn disjoint_matches_pattern() -> anyhow::Result<()> {
    let others = [
        "POINT(20 20)",
        "POINT(10 10)",
        "LINESTRING(11 0,11 10)",
        "LINESTRING(10 0,10 10)",
        "POLYGON((20 20,30 20,30 30,20 30,20 20))",
        B,
    ];
    let a = geom(A);
    for wkt in others {
        let b = geom(wkt);
        assert_eq!(
            relate(&a, &b)?.matches("FF*FF****")?,
            disjoint(&a, &b)?,
            "{wkt}"
        );
    }
    Ok(())
}

#[test]
fn boolean_ops_on_polygons() -> anyhow::Result<()> {
    let a = Polygon::<f64>::try_from_wkt_str(A).map_err(|e| anyhow::anyhow!("{}", e))?;
    let b = Polygon::<f64>::try_from_wkt_str(B).map_err(|e| anyhow::anyhow!("{}", e))?;
    assert_relative_eq!(a.union(&b)?.unsigned_area(), 175.);
    assert_relative_eq!(a.difference(&b)?.unsigned_area(), 75.);
    Ok(())
}

#[test]
fn argument_errors() {
    let gc = geom("GEOMETRYCOLLECTION(POINT(1 1),LINESTRING(0 0,1 1))");
    let a = geom(A);
    assert!(matches!(relate(&gc, &a), Err(OverlayError::UnsupportedArgument(_))));
    assert!(matches!(
        overlay(&a, &gc, OpType::Union),
        Err(OverlayError::UnsupportedArgument(_))
    ));
}

#[test]
fn input_errors() {
    let short_ring = Geometry::Polygon(Polygon::new(
        geo::LineString::from(vec![(0., 0.), (1., 0.), (0., 0.)]),
        vec![],
    ));
    let a = geom(A);
    assert!(matches!(
        overlay(&short_ring, &a, OpType::Intersection),
        Err(OverlayError::InvalidInput { .. })
    ));
    assert!(matches!(relate(&a, &short_ring), Err(OverlayError::InvalidInput { .. })));
}

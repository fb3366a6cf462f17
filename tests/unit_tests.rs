// tests/unit_tests.rs
use chrono::{NaiveDate, NaiveDateTime};
use ndarray::{Array, ArrayD, IxDyn};
use tile_tiff::batch::{BatchConfig, Operation};
use tile_tiff::io::window::ClippedRead;
use tile_tiff::io::{
    transform_from_bounds, BoundlessFill, PixelWindow,
};
use tile_tiff::selection::parse_iso_datetime;
use tile_tiff::utils::cast::cast_pixels;
use tile_tiff::{
    BBox, BandSelection, Crs, DateRange, DateSelection, Error, ExportToTiff, Feature, FeatureType,
    PixelType, RasterArray, Tile,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(0, 0, 0).unwrap()
}

fn timestamps() -> Vec<NaiveDateTime> {
    vec![
        date(2017, 1, 1),
        date(2017, 1, 15),
        date(2017, 2, 1),
        date(2017, 3, 1),
    ]
}

fn test_tile() -> Tile {
    let bbox = BBox::new(500000.0, 5000000.0, 500020.0, 5000020.0, Crs::from_epsg(32633)).unwrap();
    Tile::new(bbox, timestamps())
}

/// Array of the given shape whose values are their flat index
fn arange(shape: &[usize]) -> ArrayD<f32> {
    let len = shape.iter().product::<usize>();
    Array::from_shape_vec(IxDyn(shape), (0..len).map(|v| v as f32).collect()).unwrap()
}

#[test]
fn test_band_list_keeps_order() {
    let selection: BandSelection = "0,2,1".parse().unwrap();
    assert_eq!(selection, BandSelection::Indices(vec![0, 2, 1]));
    assert_eq!(selection.resolve(3).unwrap(), vec![0, 2, 1]);
}

#[test]
fn test_band_range_is_inclusive_and_ascending() {
    let selection: BandSelection = "1..2".parse().unwrap();
    assert_eq!(selection, BandSelection::Range { start: 1, end: 2 });
    assert_eq!(selection.resolve(4).unwrap(), vec![1, 2]);

    // Range starting at zero keeps band zero and clips to the band count
    let selection = BandSelection::range(0, 10).unwrap();
    assert_eq!(selection.resolve(3).unwrap(), vec![0, 1, 2]);
}

#[test]
fn test_band_selection_rejects_bad_input() {
    let err = "a,1".parse::<BandSelection>().unwrap_err();
    assert!(matches!(err, Error::InvalidConfiguration(_)));
    assert!(err.to_string().contains("'a'"));

    assert!(matches!(
        BandSelection::indices(vec![]),
        Err(Error::InvalidConfiguration(_))
    ));
    assert!(matches!(
        BandSelection::range(3, 1),
        Err(Error::InvalidConfiguration(_))
    ));
    assert!(matches!(
        "-1".parse::<BandSelection>(),
        Err(Error::InvalidConfiguration(_))
    ));
}

#[test]
fn test_band_selection_resolution_errors() {
    let err = BandSelection::Indices(vec![0, 5]).resolve(3).unwrap_err();
    assert!(matches!(
        err,
        Error::IndexOutOfBounds {
            axis: "band",
            index: 5,
            len: 3
        }
    ));

    // A range entirely past the last band selects nothing
    let err = BandSelection::range(5, 7).unwrap().resolve(3).unwrap_err();
    assert!(matches!(err, Error::InvalidConfiguration(_)));
}

#[test]
fn test_band_selection_from_json() {
    let list: BandSelection = serde_json::from_str("[3, 0]").unwrap();
    assert_eq!(list, BandSelection::Indices(vec![3, 0]));

    let range: BandSelection = serde_json::from_str(r#"{"start": 1, "end": 2}"#).unwrap();
    assert_eq!(range, BandSelection::Range { start: 1, end: 2 });

    let text: BandSelection = serde_json::from_str(r#""0..2""#).unwrap();
    assert_eq!(text, BandSelection::Range { start: 0, end: 2 });

    let err = serde_json::from_str::<BandSelection>("[0, 1.5]").unwrap_err();
    assert!(err.to_string().contains("1.5"), "unexpected error: {}", err);

    assert!(serde_json::from_str::<BandSelection>(r#"{"start": 0, "end": "2"}"#).is_err());
    assert!(serde_json::from_str::<BandSelection>("42").is_err());
}

#[test]
fn test_date_ranges_of_every_kind_agree() {
    let stamps = timestamps();
    let by_index = DateSelection::index_range(1, 2).unwrap();
    let by_iso = DateSelection::iso_range("2017-01-15", "2017-02-01").unwrap();
    let by_time = DateSelection::time_range(date(2017, 1, 15), date(2017, 2, 1)).unwrap();
    let parsed: DateSelection = "2017-01-15..2017-02-01T00:00:00".parse().unwrap();

    for selection in [by_index, by_iso.clone(), by_time.clone(), parsed] {
        assert_eq!(selection.resolve(&stamps, stamps.len()).unwrap(), vec![1, 2]);
    }
    assert_eq!(by_iso, by_time);
}

#[test]
fn test_date_list_and_bounds() {
    let stamps = timestamps();
    let selection: DateSelection = "3,0".parse().unwrap();
    assert_eq!(selection.resolve(&stamps, 4).unwrap(), vec![3, 0]);

    let err = DateSelection::Indices(vec![4]).resolve(&stamps, 4).unwrap_err();
    assert!(matches!(err, Error::IndexOutOfBounds { axis: "time", .. }));

    let err = DateSelection::index_range(0, 9).unwrap().resolve(&stamps, 4).unwrap_err();
    assert!(matches!(err, Error::IndexOutOfBounds { axis: "timestamp", .. }));

    let empty = DateSelection::iso_range("2018-01-01", "2018-12-31").unwrap();
    assert!(matches!(
        empty.resolve(&stamps, 4),
        Err(Error::InvalidConfiguration(_))
    ));
}

#[test]
fn test_date_selection_rejects_bad_input() {
    assert!(matches!(
        "0..2017-01-01".parse::<DateSelection>(),
        Err(Error::InvalidConfiguration(_))
    ));
    assert!(matches!(
        DateSelection::iso_range("2017-02-01", "2017-01-01"),
        Err(Error::InvalidConfiguration(_))
    ));
    assert!(matches!(
        DateSelection::iso_range("yesterday", "2017-01-01"),
        Err(Error::InvalidConfiguration(_))
    ));

    let err = serde_json::from_str::<DateSelection>(r#"{"start": 0, "end": "2017-01-01"}"#)
        .unwrap_err();
    assert!(err.to_string().contains("2017-01-01"), "unexpected error: {}", err);

    let range: DateSelection =
        serde_json::from_str(r#"{"start": "2017-01-01", "end": "2017-02-01T12:00:00"}"#).unwrap();
    assert_eq!(
        range,
        DateSelection::Range(DateRange::Times {
            start: date(2017, 1, 1),
            end: date(2017, 2, 1) + chrono::Duration::hours(12),
        })
    );
}

#[test]
fn test_parse_iso_datetime() {
    assert_eq!(parse_iso_datetime("2017-01-01").unwrap(), date(2017, 1, 1));
    assert_eq!(
        parse_iso_datetime("2017-01-01T10:20:30").unwrap(),
        date(2017, 1, 1) + chrono::Duration::seconds(10 * 3600 + 20 * 60 + 30)
    );
    assert!(parse_iso_datetime("2017-13-01").is_err());
}

#[test]
fn test_parse_iso_datetime_with_zone() {
    assert_eq!(parse_iso_datetime("2017-01-01T00:00:00Z").unwrap(), date(2017, 1, 1));
    assert_eq!(
        parse_iso_datetime("2017-01-01T01:00:00+01:00").unwrap(),
        date(2017, 1, 1)
    );
    assert_eq!(
        parse_iso_datetime("2017-01-01T12:30:00.5-02:00").unwrap(),
        date(2017, 1, 1) + chrono::Duration::milliseconds((14 * 3600 + 30 * 60) * 1000 + 500)
    );

    let selection = DateSelection::iso_range("2017-01-15T00:00:00Z", "2017-02-01T00:00:00Z").unwrap();
    assert_eq!(selection.resolve(&timestamps(), 4).unwrap(), vec![1, 2]);
}

#[test]
fn test_feature_and_crs_parsing() {
    let feature: Feature = "data/BANDS".parse().unwrap();
    assert_eq!(feature, Feature::new(FeatureType::Data, "BANDS"));
    assert_eq!(feature.to_string(), "data/BANDS");

    let feature: Feature = "mask_timeless/LULC".parse().unwrap();
    assert_eq!(feature.feature_type, FeatureType::MaskTimeless);
    assert!("bogus/X".parse::<Feature>().is_err());
    assert!("data".parse::<Feature>().is_err());

    assert_eq!("EPSG:32633".parse::<Crs>().unwrap(), Crs::from_epsg(32633));
    assert_eq!("epsg:4326".parse::<Crs>().unwrap(), Crs::WGS84);
    assert_eq!("3857".parse::<Crs>().unwrap(), Crs::WEB_MERCATOR);
    assert!(matches!("ESRI:54009".parse::<Crs>(), Err(Error::Projection(_))));
    assert_eq!(Crs::WGS84.ogc_string(), "EPSG:4326");
}

#[test]
fn test_feature_type_ranks() {
    assert_eq!(FeatureType::Data.ndim(), 4);
    assert_eq!(FeatureType::Scalar.ndim(), 2);
    assert_eq!(FeatureType::MaskTimeless.ndim(), 3);
    assert_eq!(FeatureType::ScalarTimeless.ndim(), 1);
    assert!(FeatureType::Scalar.is_temporal());
    assert!(!FeatureType::Scalar.is_spatial());
}

#[test]
fn test_bbox_validation() {
    assert!(matches!(
        BBox::new(1.0, 0.0, 0.0, 1.0, Crs::WGS84),
        Err(Error::InvalidBbox(_))
    ));
    assert!(matches!(
        BBox::new(0.0, 0.0, f64::NAN, 1.0, Crs::WGS84),
        Err(Error::InvalidBbox(_))
    ));
}

#[test]
fn test_tile_insert_checks_rank_and_overwrites() {
    let mut tile = test_tile();
    let mask = Feature::new(FeatureType::MaskTimeless, "M");

    let err = tile
        .insert(mask.clone(), RasterArray::from(arange(&[2, 2])))
        .unwrap_err();
    assert!(matches!(err, Error::ShapeMismatch { expected: 3, .. }));

    assert!(tile.insert(mask.clone(), arange(&[2, 2, 1]).into()).unwrap().is_none());
    let previous = tile.insert(mask.clone(), arange(&[3, 3, 1]).into()).unwrap();
    assert_eq!(previous.unwrap().shape(), &[2, 2, 1]);
    assert_eq!(tile.get(&mask).unwrap().shape(), &[3, 3, 1]);
    assert_eq!(tile.features().collect::<Vec<_>>(), vec![mask.clone()]);

    assert!(tile.remove(&mask).is_some());
    assert!(!tile.contains(&mask));
}

#[test]
fn test_tile_json_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tile.json");

    let mut tile = test_tile();
    tile.insert(Feature::new(FeatureType::Data, "BANDS"), arange(&[4, 2, 2, 3]).into())
        .unwrap();
    tile.save(&path).unwrap();

    let loaded = Tile::load(&path).unwrap();
    assert_eq!(loaded, tile);
    assert_eq!(
        loaded.get(&Feature::new(FeatureType::Data, "BANDS")).unwrap().pixel_type(),
        PixelType::F32
    );
}

#[test]
fn test_tile_load_rejects_invalid_bbox() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tile.json");
    std::fs::write(
        &path,
        r#"{"bbox": {"min_x": 1.0, "min_y": 0.0, "max_x": 0.0, "max_y": 1.0, "crs": "EPSG:4326"}}"#,
    )
    .unwrap();
    assert!(matches!(Tile::load(&path), Err(Error::InvalidBbox(_))));
}

#[test]
fn test_transform_from_bounds() {
    let bbox = BBox::new(0.0, 0.0, 10.0, 20.0, Crs::WGS84).unwrap();
    assert_eq!(
        transform_from_bounds(&bbox, 5, 4),
        [0.0, 2.0, 0.0, 20.0, 0.0, -5.0]
    );
}

#[test]
fn test_pixel_window_from_corners() {
    let geo_transform = [100.0, 10.0, 0.0, 200.0, 0.0, -10.0];
    let window = PixelWindow::from_corners((120.0, 180.0), (150.0, 130.0), &geo_transform);
    assert_eq!(
        window,
        PixelWindow {
            top: 2,
            bottom: 7,
            left: 2,
            right: 5
        }
    );
    assert_eq!(window.size().unwrap(), (3, 5));

    // Offsets truncate toward zero
    let window = PixelWindow::from_corners((95.0, 205.0), (116.0, 174.0), &geo_transform);
    assert_eq!((window.top, window.left), (0, 0));
    assert_eq!((window.bottom, window.right), (2, 1));
}

#[test]
fn test_pixel_window_empty() {
    let window = PixelWindow {
        top: 3,
        bottom: 3,
        left: 0,
        right: 4,
    };
    assert!(matches!(
        window.size(),
        Err(Error::EmptyWindow { width: 4, height: 0 })
    ));
}

#[test]
fn test_window_clip_partial_overlap() {
    let window = PixelWindow {
        top: -2,
        bottom: 3,
        left: -1,
        right: 4,
    };
    assert_eq!(
        window.clip((3, 3), (5, 5)),
        Some(ClippedRead {
            source_offset: (0, 0),
            source_size: (3, 3),
            target_offset: (1, 2),
            target_size: (3, 3),
        })
    );
}

#[test]
fn test_window_clip_outside_and_scaled() {
    let outside = PixelWindow {
        top: 20,
        bottom: 25,
        left: 0,
        right: 5,
    };
    assert_eq!(outside.clip((10, 10), (5, 5)), None);

    let window = PixelWindow {
        top: 0,
        bottom: 4,
        left: 0,
        right: 4,
    };
    assert_eq!(
        window.clip((10, 10), (2, 2)),
        Some(ClippedRead {
            source_offset: (0, 0),
            source_size: (4, 4),
            target_offset: (0, 0),
            target_size: (2, 2),
        })
    );
}

#[test]
fn test_cast_pixels_saturates() {
    let values = cast_pixels::<u8, _>([1.7, -3.0, 300.0, f64::NAN]);
    assert_eq!(values, vec![1, 0, 255, 0]);

    let values = cast_pixels::<i16, _>([-1.9, 40000.0]);
    assert_eq!(values, vec![-1, i16::MAX]);
}

#[test]
fn test_boundless_fill_parsing() {
    assert_eq!("nodata".parse::<BoundlessFill>().unwrap(), BoundlessFill::NoData);
    assert_eq!("zero".parse::<BoundlessFill>().unwrap(), BoundlessFill::Zero);
    assert_eq!("-5".parse::<BoundlessFill>().unwrap(), BoundlessFill::Value(-5.0));
    assert!("nan-ish".parse::<BoundlessFill>().is_err());
}

#[test]
fn test_select_temporal_feature() {
    let mut tile = test_tile();
    let feature = Feature::new(FeatureType::Data, "BANDS");
    tile.insert(feature.clone(), arange(&[4, 2, 2, 3]).into()).unwrap();

    let exporter = ExportToTiff::new(feature)
        .band_indices(BandSelection::indices(vec![2, 0]).unwrap())
        .date_indices(DateSelection::iso_range("2017-01-15", "2017-02-01").unwrap());
    let stack = exporter.select(&tile).unwrap();

    assert_eq!(stack.dim(), (2, 2, 2, 2));
    // time 1, row 0, col 0: flat index 1 * 12 = 12, band 2 -> 14
    assert_eq!(stack[[0, 0, 0, 0]], 14.0);
    assert_eq!(stack[[0, 0, 0, 1]], 12.0);
    // time 2, row 1, col 1: 2 * 12 + 1 * 6 + 1 * 3 = 33
    assert_eq!(stack[[1, 1, 1, 0]], 35.0);
    assert_eq!(stack[[1, 1, 1, 1]], 33.0);
}

#[test]
fn test_select_normalizes_rank() {
    let mut tile = test_tile();
    let scalar = Feature::new(FeatureType::Scalar, "CLOUD");
    let timeless = Feature::new(FeatureType::DataTimeless, "DEM");
    let scalar_timeless = Feature::new(FeatureType::ScalarTimeless, "STATS");
    tile.insert(scalar.clone(), arange(&[4, 2]).into()).unwrap();
    tile.insert(timeless.clone(), arange(&[3, 5, 2]).into()).unwrap();
    tile.insert(scalar_timeless.clone(), arange(&[3]).into()).unwrap();

    let stack = ExportToTiff::new(scalar)
        .date_indices(DateSelection::index_range(0, 3).unwrap())
        .band_indices(BandSelection::range(0, 1).unwrap())
        .select(&tile)
        .unwrap();
    assert_eq!(stack.dim(), (4, 1, 1, 2));
    assert_eq!(stack[[3, 0, 0, 1]], 7.0);

    let stack = ExportToTiff::new(timeless).select(&tile).unwrap();
    assert_eq!(stack.dim(), (1, 3, 5, 1));

    let stack = ExportToTiff::new(scalar_timeless)
        .band_indices(BandSelection::indices(vec![2, 1, 0]).unwrap())
        .select(&tile)
        .unwrap();
    assert_eq!(stack.dim(), (1, 1, 1, 3));
    assert_eq!(stack[[0, 0, 0, 0]], 2.0);
}

#[test]
fn test_select_missing_feature() {
    let tile = test_tile();
    let err = ExportToTiff::new(Feature::new(FeatureType::Mask, "NOPE"))
        .select(&tile)
        .unwrap_err();
    assert!(matches!(err, Error::FeatureNotFound(_)));
}

#[test]
fn test_batch_config_parsing() {
    let config: BatchConfig = serde_json::from_str(
        r#"{
            "global": {"folder": "out", "image_dtype": "u16", "fill": {"value": -1.0}},
            "operations": [
                {
                    "type": "export",
                    "tile": "patch.json",
                    "feature": {"type": "data", "name": "BANDS"},
                    "filename": "bands.tif",
                    "band_indices": {"start": 0, "end": 2},
                    "date_indices": {"start": "2017-01-01", "end": "2017-02-01"}
                },
                {
                    "type": "import",
                    "tile": "patch.json",
                    "path": "lulc.tif",
                    "mask_name": "LULC",
                    "width": 100,
                    "height": 100,
                    "fill": "zero"
                }
            ]
        }"#,
    )
    .unwrap();

    assert_eq!(config.global.image_dtype, PixelType::U16);
    assert_eq!(config.global.fill, BoundlessFill::Value(-1.0));
    assert_eq!(config.operations.len(), 2);
    match &config.operations[0] {
        Operation::Export { band_indices, date_indices, .. } => {
            assert_eq!(*band_indices, BandSelection::Range { start: 0, end: 2 });
            assert!(matches!(date_indices, DateSelection::Range(DateRange::Times { .. })));
        }
        other => panic!("expected export, got {:?}", other),
    }
    match &config.operations[1] {
        Operation::Import { fill, width, .. } => {
            assert_eq!(*fill, Some(BoundlessFill::Zero));
            assert_eq!(*width, Some(100));
        }
        other => panic!("expected import, got {:?}", other),
    }
}

#[test]
fn test_batch_config_rejects_bad_selector() {
    let result = serde_json::from_str::<BatchConfig>(
        r#"{"operations": [{
            "type": "export",
            "tile": "patch.json",
            "feature": {"type": "data", "name": "BANDS"},
            "filename": "bands.tif",
            "band_indices": ["red"]
        }]}"#,
    );
    assert!(result.is_err());
}

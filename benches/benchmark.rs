use chrono::{Duration, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ndarray::{Array, ArrayD, IxDyn};
use tile_tiff::{
    BBox, BandSelection, Crs, DateSelection, ExportToTiff, Feature, FeatureType, PixelType, Tile,
};

/// Tile with a (12, 256, 256, 13) data feature, a year of monthly Sentinel-2-like scenes
fn synthetic_tile() -> (Tile, Feature) {
    let start = NaiveDate::from_ymd_opt(2017, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    let timestamps = (0..12).map(|i| start + Duration::days(30 * i)).collect();
    let bbox = BBox::new(500000.0, 5000000.0, 502560.0, 5002560.0, Crs::from_epsg(32633)).unwrap();
    let mut tile = Tile::new(bbox, timestamps);

    let shape = [12, 256, 256, 13];
    let len = shape.iter().product::<usize>();
    let data: ArrayD<f32> =
        Array::from_shape_vec(IxDyn(&shape), (0..len).map(|i| (i % 10000) as f32).collect()).unwrap();

    let feature = Feature::new(FeatureType::Data, "BANDS");
    tile.insert(feature.clone(), data.into()).unwrap();
    (tile, feature)
}

/// Benchmark band/date selection and reshaping in isolation
fn benchmark_selection(c: &mut Criterion) {
    let (tile, feature) = synthetic_tile();
    let exporter = ExportToTiff::new(feature)
        .band_indices(BandSelection::indices(vec![3, 2, 1]).unwrap())
        .date_indices(DateSelection::iso_range("2017-03-01", "2017-09-01").unwrap());

    c.bench_function("select_rgb_summer", |b| {
        b.iter(|| exporter.select(black_box(&tile)).unwrap())
    });
}

/// Benchmark a full export to a scratch GeoTIFF
fn benchmark_export(c: &mut Criterion) {
    let (tile, feature) = synthetic_tile();
    let dir = match tempfile::tempdir() {
        Ok(dir) => dir,
        Err(e) => {
            println!("Skipping export benchmark - no scratch directory: {e}");
            return;
        }
    };
    let exporter = ExportToTiff::new(feature)
        .folder(dir.path())
        .band_indices(BandSelection::range(0, 12).unwrap())
        .date_indices(DateSelection::index_range(0, 11).unwrap())
        .image_dtype(PixelType::U16);

    c.bench_function("export_full_stack_u16", |b| {
        b.iter(|| {
            exporter
                .execute(black_box(tile.clone()), "benchmark_output.tif")
                .unwrap()
        })
    });
}

criterion_group!(benches, benchmark_selection, benchmark_export);
criterion_main!(benches);

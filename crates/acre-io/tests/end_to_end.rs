//! File-to-plan round trip: request, weather, profiles, and rules all read
//! from disk and fed through the collaborator seams.

use std::fs;
use std::io::Write;

use acre_algo::optimize_with_sources;
use acre_core::CropId;
use acre_io::{read_request, FileCropProfileSource, FileInteractionRuleSource, FileWeatherSource};

fn write_file(dir: &tempfile::TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    let mut file = fs::File::create(&path).unwrap();
    file.write_all(content.as_bytes()).unwrap();
    path
}

#[test]
fn files_to_plan() {
    let dir = tempfile::tempdir().unwrap();

    let request_path = write_file(
        &dir,
        "request.json",
        r#"{
            "fields": [
                {"id": "north", "name": "North", "area": 100.0,
                 "daily_fixed_cost": 5.0, "fallow_period_days": 7}
            ],
            "horizon": {"start": "2025-04-01", "end": "2025-05-30"},
            "crops": [{"crop_id": "cress"}],
            "config": {"enable_local_search": false, "start_date_stride_days": 7}
        }"#,
    );

    // 60 days of optimal growing weather
    let mut weather_rows = String::from(
        "time,temperature_2m_mean,temperature_2m_max,temperature_2m_min,precipitation_sum,sunshine_duration\n",
    );
    let mut day = chrono::NaiveDate::from_ymd_opt(2025, 4, 1).unwrap();
    for _ in 0..60 {
        weather_rows.push_str(&format!("{},22.0,26.0,18.0,1.0,28800\n", day));
        day = day.succ_opt().unwrap();
    }
    let weather_path = write_file(&dir, "weather.csv", &weather_rows);

    let profiles_path = write_file(
        &dir,
        "profiles.json",
        r#"[{
            "crop": {"id": "cress", "name": "Cress", "area_per_unit": 1.0,
                     "revenue_per_area": 10.0, "groups": ["Brassicaceae"]},
            "stages": [
                {"order": 1, "name": "season",
                 "temperature": {"base_temperature": 10.0, "optimal_min": 20.0,
                                 "optimal_max": 28.0, "low_stress_threshold": 12.0,
                                 "high_stress_threshold": 30.0, "frost_threshold": 2.0,
                                 "max_temperature": 35.0},
                 "sunshine": {"minimum_hours": 4.0, "target_hours": 8.0},
                 "thermal": {"required_gdd": 60.0}}
            ]
        }]"#,
    );

    let rules_path = write_file(
        &dir,
        "rules.json",
        r#"[{"rule_id": "r1", "rule_type": "continuous_cultivation",
             "source_group": "Brassicaceae", "target_group": "Brassicaceae",
             "impact_ratio": 0.9, "is_directional": true}]"#,
    );

    let request = read_request(&request_path).unwrap();
    let result = optimize_with_sources(
        &request,
        &FileWeatherSource::new(weather_path),
        &FileCropProfileSource::open(&profiles_path).unwrap(),
        &FileInteractionRuleSource::new(rules_path),
    )
    .unwrap();

    assert!(result.success);
    assert!(!result.solution.is_empty());
    assert!(result.solution.verify(&request.horizon).is_ok());
    assert!(result.crop_areas.contains_key(&CropId::new("cress")));
    // The file-sourced continuous-cultivation rule reaches the rescoring:
    // any successor run earns 0.9 of its base revenue (times recovery)
    let north = &result.field_schedules[0];
    assert!(north.entries.len() >= 2);
    assert!(north.entries[1].revenue < north.entries[0].revenue);
}

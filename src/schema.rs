// Diesel declaration of the fixed-shape table written by the sleep pipeline.
// Daylio tables are declared at runtime by table_info.json and have no entry here.

diesel::table! {
    fitbit_sleep (start_time) {
        date -> Text,
        date_ymd -> Text,
        duration_milliseconds -> BigInt,
        duration_seconds -> BigInt,
        duration_minutes -> BigInt,
        duration_hours -> BigInt,
        duration_hhmmss -> Text,
        sleep_type -> Text,
        night_of_sleep -> Nullable<Text>,
        day_of_nap -> Nullable<Text>,
        start_time -> Text,
        start_time_ymdhm -> Text,
        end_time -> Text,
        end_time_ymdhm -> Text,
        efficiency -> BigInt,
        minutes_asleep -> BigInt,
        minutes_awake -> BigInt,
        main_sleep -> Bool,
        deep_sleep_count -> Nullable<BigInt>,
        deep_sleep_minutes -> Nullable<BigInt>,
        light_sleep_count -> Nullable<BigInt>,
        light_sleep_minutes -> Nullable<BigInt>,
        rem_sleep_count -> Nullable<BigInt>,
        rem_sleep_minutes -> Nullable<BigInt>,
        wake_count -> Nullable<BigInt>,
        wake_minutes -> Nullable<BigInt>,
        asleep_count -> Nullable<BigInt>,
        asleep_minutes -> Nullable<BigInt>,
        awake_count -> Nullable<BigInt>,
        awake_minutes -> Nullable<BigInt>,
        restless_count -> Nullable<BigInt>,
        restless_minutes -> Nullable<BigInt>,
        sleep_log_type -> Text,
    }
}

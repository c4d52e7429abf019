// Property tests: a record survives record → row → record unchanged.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use proptest::option;
use proptest::prelude::*;

use jlife_records::{
    record_to_row, row_to_record, AttendanceData, EventData, InventoryData, MemberData, Record,
    RecordKind, TabularRecord,
};

fn word() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9陳李王大文小明-]{1,12}"
}

fn date() -> impl Strategy<Value = NaiveDate> {
    (1920i32..2030, 1u32..=12, 1u32..=28).prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

fn time() -> impl Strategy<Value = NaiveTime> {
    (0u32..24, 0u32..60, 0u32..60).prop_map(|(h, m, s)| NaiveTime::from_hms_opt(h, m, s).unwrap())
}

fn datetime() -> impl Strategy<Value = NaiveDateTime> {
    (date(), time()).prop_map(|(d, t)| d.and_time(t))
}

fn member() -> impl Strategy<Value = MemberData> {
    (
        (option::of(word()), word(), option::of(word()), option::of(word()), option::of(date())),
        (option::of(word()), option::of(word()), option::of(word()), option::of(word()), option::of(word())),
        (option::of(word()), option::of(word()), option::of(word()), option::of(word()), option::of(any::<i64>())),
        (option::of(word()), option::of(word()), option::of(date()), option::of(word()), option::of(word())),
    )
        .prop_map(|(a, b, c, d)| MemberData {
            member_number: a.0,
            chinese_name: a.1,
            english_name: a.2,
            gender: a.3,
            birth_date: a.4,
            national_id: b.0,
            phone: b.1,
            email: b.2,
            address: b.3,
            district: b.4,
            economic_status: c.0,
            occupation: c.1,
            education: c.2,
            marital_status: c.3,
            household_size: c.4,
            emergency_contact: d.0,
            emergency_phone: d.1,
            join_date: d.2,
            status: d.3,
            notes: d.4,
        })
}

fn inventory() -> impl Strategy<Value = InventoryData> {
    (
        (date(), word(), option::of(word()), option::of(0i64..100_000), option::of(word())),
        (
            option::of(0.0f64..10_000.0),
            option::of(0.0f64..1_000.0),
            option::of(0.0f64..1_000_000.0),
            option::of(word()),
            option::of(word()),
            option::of(word()),
            option::of(word()),
        ),
    )
        .prop_map(|(a, b)| InventoryData {
            month: a.0,
            product_code: a.1,
            description: a.2,
            quantity: a.3,
            unit: a.4,
            total_weight_kg: b.0,
            unit_price: b.1,
            total_amount: b.2,
            source: b.3,
            supplier: b.4,
            location: b.5,
            notes: b.6,
        })
}

fn event() -> impl Strategy<Value = EventData> {
    (
        (word(), word(), date(), option::of(time()), option::of(word())),
        (option::of(word()), option::of(word()), option::of(word()), option::of(0i64..10_000), option::of(word())),
    )
        .prop_map(|(a, b)| EventData {
            event_code: a.0,
            name: a.1,
            date: a.2,
            time: a.3,
            location: a.4,
            event_type: b.0,
            organizer: b.1,
            person_in_charge: b.2,
            expected_headcount: b.3,
            notes: b.4,
        })
}

fn attendance() -> impl Strategy<Value = AttendanceData> {
    (word(), word(), any::<bool>(), option::of(datetime()), option::of(datetime()), option::of(word()))
        .prop_map(|(m, e, attended, cin, cout, notes)| AttendanceData {
            member_number: m,
            event_code: e,
            attended,
            checked_in_at: cin,
            checked_out_at: cout,
            notes,
        })
}

proptest! {
    #[test]
    fn member_round_trip(m in member()) {
        prop_assert_eq!(MemberData::from_row(&m.to_row()), Ok(m));
    }

    #[test]
    fn inventory_round_trip(item in inventory()) {
        prop_assert_eq!(InventoryData::from_row(&item.to_row()), Ok(item));
    }

    #[test]
    fn event_round_trip(e in event()) {
        prop_assert_eq!(EventData::from_row(&e.to_row()), Ok(e));
    }

    #[test]
    fn attendance_round_trip(a in attendance()) {
        prop_assert_eq!(AttendanceData::from_row(&a.to_row()), Ok(a));
    }

    #[test]
    fn record_enum_round_trip(m in member()) {
        let record = Record::Member(m);
        let row = record_to_row(&record);
        prop_assert_eq!(row_to_record(&row, RecordKind::Member), Ok(record));
    }
}

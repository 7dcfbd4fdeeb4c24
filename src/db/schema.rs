diesel::table! {
    companies (ticker, company) {
        ticker -> Text,
        company -> Text,
        updated_at -> Timestamp,
        document -> Text,
    }
}

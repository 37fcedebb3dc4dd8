//! Route table. Paths mirror the client surface one to one.

use actix_web::web;

use super::handlers::{appointments, auth, billing, doctors, ipd, patients, profile, records, ward};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .route("/login", web::post().to(auth::login))
            .route("/register", web::post().to(auth::register))
            .route("/logout", web::post().to(auth::logout))
            .route("/me", web::get().to(auth::me))
            .route("/refresh", web::post().to(auth::refresh)),
    )
    .service(
        web::scope("/patients")
            .route("", web::get().to(patients::list))
            .route("", web::post().to(patients::create))
            .route("/{id}", web::get().to(patients::get))
            .route("/{id}", web::patch().to(patients::update))
            .route("/{id}", web::delete().to(patients::delete)),
    )
    .service(
        web::scope("/doctors")
            .route("", web::get().to(doctors::list))
            .route("", web::post().to(doctors::create))
            .route("/{id}", web::get().to(doctors::get))
            .route("/{id}", web::patch().to(doctors::update))
            .route("/{id}", web::delete().to(doctors::delete)),
    )
    .service(
        web::scope("/appointments")
            .route("", web::get().to(appointments::list))
            .route("", web::post().to(appointments::create))
            .route("/{id}", web::get().to(appointments::get))
            .route("/{id}", web::patch().to(appointments::update))
            .route("/{id}", web::delete().to(appointments::delete)),
    )
    .service(
        web::scope("/medical-records")
            .route("", web::get().to(records::list_records))
            .route("", web::post().to(records::create_record))
            .route("/{id}", web::get().to(records::get_record))
            .route("/{id}", web::patch().to(records::update_record))
            .route("/{id}", web::delete().to(records::delete_record)),
    )
    .service(
        web::scope("/prescriptions")
            .route("", web::get().to(records::list_prescriptions))
            .route("", web::post().to(records::create_prescription))
            .route("/{id}", web::get().to(records::get_prescription))
            .route("/{id}", web::patch().to(records::update_prescription))
            .route("/{id}", web::delete().to(records::delete_prescription)),
    )
    .service(
        web::scope("/ipd-patients")
            .route("", web::get().to(ipd::list))
            .route("", web::post().to(ipd::create))
            .route("/{id}", web::get().to(ipd::get))
            .route("/{id}", web::patch().to(ipd::update))
            .route("/{id}", web::delete().to(ipd::delete))
            .route("/{id}/discharge", web::post().to(ipd::discharge)),
    )
    .service(
        web::scope("/vitals")
            .route("", web::get().to(ward::list_vitals))
            .route("", web::post().to(ward::create_vital))
            .route("/{id}", web::get().to(ward::get_vital))
            .route("/{id}", web::patch().to(ward::update_vital))
            .route("/{id}", web::delete().to(ward::delete_vital)),
    )
    .service(
        web::scope("/medicine-schedule")
            .route("", web::get().to(ward::list_medicine))
            .route("", web::post().to(ward::create_medicine))
            .route("/{id}", web::get().to(ward::get_medicine))
            .route("/{id}", web::patch().to(ward::update_medicine))
            .route("/{id}", web::delete().to(ward::delete_medicine)),
    )
    .service(
        web::scope("/iv-schedule")
            .route("", web::get().to(ward::list_iv))
            .route("", web::post().to(ward::create_iv))
            .route("/{id}", web::get().to(ward::get_iv))
            .route("/{id}", web::patch().to(ward::update_iv))
            .route("/{id}", web::delete().to(ward::delete_iv)),
    )
    .service(
        web::scope("/doctor-visits")
            .route("", web::get().to(ward::list_visits))
            .route("", web::post().to(ward::create_visit))
            .route("/{id}", web::get().to(ward::get_visit))
            .route("/{id}", web::patch().to(ward::update_visit))
            .route("/{id}", web::delete().to(ward::delete_visit)),
    )
    .service(
        web::scope("/bills")
            .route("", web::get().to(billing::list))
            .route("", web::post().to(billing::create))
            .route("/{id}", web::get().to(billing::get))
            .route("/{id}", web::patch().to(billing::update))
            .route("/{id}", web::delete().to(billing::delete))
            .route("/{id}/payments", web::post().to(billing::record_payment)),
    )
    .service(
        web::scope("/profile")
            .route("", web::get().to(profile::get))
            .route("", web::patch().to(profile::update)),
    );
}

//! External service clients/adapters.

pub mod yandex_speller;

pub use yandex_speller::YandexSpeller;

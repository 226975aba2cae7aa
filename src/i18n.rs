//! Locale negotiation and the static message catalog used by reports.
//!
//! Two locales are supported: English and Arabic. The locale for a request is
//! taken from the `lang` query parameter (the last one when repeated), then
//! `Accept-Language`, then the configured default.

use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::header, http::request::Parts};
use serde::{Deserialize, Serialize};
use std::{convert::Infallible, fmt, str::FromStr};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Ar,
}

impl Locale {
    pub fn code(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Ar => "ar",
        }
    }

    pub fn is_rtl(&self) -> bool {
        matches!(self, Locale::Ar)
    }

    /// Parses a language tag such as `ar`, `ar-SA` or `en_US`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        let primary = tag
            .trim()
            .split(|c| c == '-' || c == '_')
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        match primary.as_str() {
            "ar" => Some(Locale::Ar),
            "en" => Some(Locale::En),
            _ => None,
        }
    }

    /// Picks the first supported language of an `Accept-Language` header,
    /// honouring `q` weights. `q=0` marks a language as unacceptable.
    pub fn from_accept_language(header: &str) -> Option<Self> {
        let mut candidates: Vec<(f32, Locale)> = header
            .split(',')
            .filter_map(|part| {
                let mut pieces = part.split(';');
                let locale = Locale::from_tag(pieces.next()?)?;
                let weight = pieces
                    .find_map(|p| p.trim().strip_prefix("q="))
                    .and_then(|q| q.parse::<f32>().ok())
                    .unwrap_or(1.0);
                Some((weight, locale))
            })
            .filter(|(weight, _)| *weight > 0.0)
            .collect();
        // Stable sort keeps header order for equal weights
        candidates.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        candidates.first().map(|(_, locale)| *locale)
    }

    pub fn text(&self, msg: Msg) -> &'static str {
        match self {
            Locale::En => msg.en(),
            Locale::Ar => msg.ar(),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Locale::from_tag(s).ok_or_else(|| format!("unsupported locale '{}'", s))
    }
}

/// Server-wide fallback locale, installed as a request extension by the router.
#[derive(Debug, Clone, Copy)]
pub struct DefaultLocale(pub Locale);

#[async_trait]
impl<S> FromRequestParts<S> for Locale
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let from_query = parts.uri.query().and_then(|q| {
            url::form_urlencoded::parse(q.as_bytes())
                .filter(|(k, _)| k == "lang")
                .last()
                .and_then(|(_, v)| Locale::from_tag(&v))
        });
        if let Some(locale) = from_query {
            return Ok(locale);
        }

        let from_header = parts
            .headers
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|v| v.to_str().ok())
            .and_then(Locale::from_accept_language);
        if let Some(locale) = from_header {
            return Ok(locale);
        }

        Ok(parts
            .extensions
            .get::<DefaultLocale>()
            .map(|d| d.0)
            .unwrap_or_default())
    }
}

/// Catalog keys for static report text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Msg {
    // Report titles
    VeterinaryTitle,
    TrainingTitle,
    FeedingTitle,
    CheckupTitle,
    // Column labels
    Date,
    Dog,
    DogCode,
    Project,
    Veterinarian,
    VisitType,
    Diagnosis,
    Treatment,
    Cost,
    Trainer,
    Category,
    DurationMinutes,
    SuccessRating,
    Recorder,
    MealType,
    FoodType,
    QuantityGrams,
    WaterMl,
    Examiner,
    Temperature,
    HeartRate,
    WeightKg,
    Status,
    Notes,
    // KPI labels
    TotalVisits,
    EmergencyVisits,
    DistinctDogs,
    TotalCost,
    VisitsByType,
    Sessions,
    TotalHours,
    AvgSuccessRating,
    SessionsByCategory,
    MealsLogged,
    TotalFoodKg,
    TotalWaterL,
    AvgFoodPerDogDay,
    Checkups,
    AbnormalFindings,
    CriticalFindings,
    AvgTemperature,
    // Page furniture
    Period,
    GeneratedAt,
    Page,
    Of,
    NoRows,
    Kpis,
    TotalRows,
}

impl Msg {
    pub fn en(&self) -> &'static str {
        match self {
            Msg::VeterinaryTitle => "Veterinary Visits Report",
            Msg::TrainingTitle => "Training Activities Report",
            Msg::FeedingTitle => "Feeding Log Report",
            Msg::CheckupTitle => "Health Checkup Report",
            Msg::Date => "Date",
            Msg::Dog => "Dog",
            Msg::DogCode => "Dog code",
            Msg::Project => "Project",
            Msg::Veterinarian => "Veterinarian",
            Msg::VisitType => "Visit type",
            Msg::Diagnosis => "Diagnosis",
            Msg::Treatment => "Treatment",
            Msg::Cost => "Cost",
            Msg::Trainer => "Trainer",
            Msg::Category => "Category",
            Msg::DurationMinutes => "Duration (min)",
            Msg::SuccessRating => "Success rating",
            Msg::Recorder => "Recorded by",
            Msg::MealType => "Meal",
            Msg::FoodType => "Food type",
            Msg::QuantityGrams => "Quantity (g)",
            Msg::WaterMl => "Water (ml)",
            Msg::Examiner => "Examiner",
            Msg::Temperature => "Temperature (°C)",
            Msg::HeartRate => "Heart rate",
            Msg::WeightKg => "Weight (kg)",
            Msg::Status => "Status",
            Msg::Notes => "Notes",
            Msg::TotalVisits => "Total visits",
            Msg::EmergencyVisits => "Emergency visits",
            Msg::DistinctDogs => "Dogs covered",
            Msg::TotalCost => "Total cost",
            Msg::VisitsByType => "Visits by type",
            Msg::Sessions => "Training sessions",
            Msg::TotalHours => "Total hours",
            Msg::AvgSuccessRating => "Average success rating",
            Msg::SessionsByCategory => "Sessions by category",
            Msg::MealsLogged => "Meals logged",
            Msg::TotalFoodKg => "Total food (kg)",
            Msg::TotalWaterL => "Total water (L)",
            Msg::AvgFoodPerDogDay => "Average food per dog per day (g)",
            Msg::Checkups => "Checkups",
            Msg::AbnormalFindings => "Abnormal findings",
            Msg::CriticalFindings => "Critical findings",
            Msg::AvgTemperature => "Average temperature (°C)",
            Msg::Period => "Period",
            Msg::GeneratedAt => "Generated at",
            Msg::Page => "Page",
            Msg::Of => "of",
            Msg::NoRows => "No records for the selected period",
            Msg::Kpis => "Key indicators",
            Msg::TotalRows => "Total records",
        }
    }

    pub fn ar(&self) -> &'static str {
        match self {
            Msg::VeterinaryTitle => "تقرير الزيارات البيطرية",
            Msg::TrainingTitle => "تقرير أنشطة التدريب",
            Msg::FeedingTitle => "تقرير سجلات التغذية",
            Msg::CheckupTitle => "تقرير الفحوصات الدورية",
            Msg::Date => "التاريخ",
            Msg::Dog => "الكلب",
            Msg::DogCode => "رمز الكلب",
            Msg::Project => "المشروع",
            Msg::Veterinarian => "الطبيب البيطري",
            Msg::VisitType => "نوع الزيارة",
            Msg::Diagnosis => "التشخيص",
            Msg::Treatment => "العلاج",
            Msg::Cost => "التكلفة",
            Msg::Trainer => "المدرب",
            Msg::Category => "الفئة",
            Msg::DurationMinutes => "المدة (دقائق)",
            Msg::SuccessRating => "تقييم النجاح",
            Msg::Recorder => "المسجل",
            Msg::MealType => "الوجبة",
            Msg::FoodType => "نوع الطعام",
            Msg::QuantityGrams => "الكمية (غرام)",
            Msg::WaterMl => "الماء (مل)",
            Msg::Examiner => "الفاحص",
            Msg::Temperature => "درجة الحرارة (°م)",
            Msg::HeartRate => "معدل النبض",
            Msg::WeightKg => "الوزن (كغ)",
            Msg::Status => "الحالة",
            Msg::Notes => "ملاحظات",
            Msg::TotalVisits => "إجمالي الزيارات",
            Msg::EmergencyVisits => "الزيارات الطارئة",
            Msg::DistinctDogs => "عدد الكلاب",
            Msg::TotalCost => "إجمالي التكلفة",
            Msg::VisitsByType => "الزيارات حسب النوع",
            Msg::Sessions => "الجلسات التدريبية",
            Msg::TotalHours => "إجمالي الساعات",
            Msg::AvgSuccessRating => "متوسط تقييم النجاح",
            Msg::SessionsByCategory => "الجلسات حسب الفئة",
            Msg::MealsLogged => "الوجبات المسجلة",
            Msg::TotalFoodKg => "إجمالي الطعام (كغ)",
            Msg::TotalWaterL => "إجمالي الماء (لتر)",
            Msg::AvgFoodPerDogDay => "متوسط الطعام لكل كلب يومياً (غرام)",
            Msg::Checkups => "الفحوصات",
            Msg::AbnormalFindings => "نتائج غير طبيعية",
            Msg::CriticalFindings => "حالات حرجة",
            Msg::AvgTemperature => "متوسط درجة الحرارة (°م)",
            Msg::Period => "الفترة",
            Msg::GeneratedAt => "تاريخ الإنشاء",
            Msg::Page => "صفحة",
            Msg::Of => "من",
            Msg::NoRows => "لا توجد سجلات للفترة المحددة",
            Msg::Kpis => "المؤشرات الرئيسية",
            Msg::TotalRows => "إجمالي السجلات",
        }
    }
}

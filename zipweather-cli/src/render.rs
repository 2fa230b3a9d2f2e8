//! Plain-text rendering of stages, weather cards and errors.

use chrono::Local;
use zipweather_core::{ClassifiedError, Stage, StageEvent, WeatherData};

/// Pick an icon for a free-text condition such as "Chance Light Rain".
pub fn condition_icon(conditions: &str) -> &'static str {
    let c = conditions.to_lowercase();
    let has = |needle: &str| c.contains(needle);

    if has("sunny") || has("clear") {
        return "☀️";
    }
    if has("partly cloudy") || has("partly sunny") {
        return "⛅";
    }
    if has("cloudy") || has("overcast") {
        return "☁️";
    }
    if has("rain") || has("drizzle") || has("shower") {
        return if has("light") { "🌦️" } else { "🌧️" };
    }
    if has("thunder") || has("storm") {
        return "⛈️";
    }
    if has("snow") || has("flurr") {
        return "🌨️";
    }
    if has("fog") || has("mist") || has("haze") {
        return "🌫️";
    }
    if has("wind") || has("breezy") {
        return "💨";
    }
    if has("night") {
        return "🌙";
    }
    "⛅"
}

pub fn icon_description(icon: &str) -> &'static str {
    match icon {
        "☀️" => "Sunny",
        "⛅" => "Partly Cloudy",
        "☁️" => "Cloudy",
        "🌦️" => "Light Rain",
        "🌧️" => "Rain",
        "⛈️" => "Thunderstorm",
        "🌨️" => "Snow",
        "🌫️" => "Fog",
        "💨" => "Windy",
        "🌙" => "Night",
        _ => "Weather",
    }
}

/// Tracks visibility so stages activated while hidden are not printed.
#[derive(Debug, Default)]
pub struct ProgressView {
    visible: bool,
}

impl ProgressView {
    /// The line to print for `event`, if any.
    pub fn on_event(&mut self, event: StageEvent) -> Option<String> {
        match event {
            StageEvent::Shown => {
                self.visible = true;
                None
            }
            StageEvent::Hidden => {
                self.visible = false;
                None
            }
            StageEvent::Reset => None,
            StageEvent::Activated(stage) if self.visible => Some(stage_line(stage)),
            StageEvent::Activated(_) => None,
        }
    }
}

pub fn stage_line(stage: Stage) -> String {
    format!("{}  {}  ({})", stage.icon(), stage.label(), stage.status_text())
}

pub fn weather_card(weather: &WeatherData) -> String {
    let icon = condition_icon(&weather.conditions);
    let unit = &weather.temperature_unit;
    let updated = weather.timestamp.with_timezone(&Local).format("%-I:%M %p");

    format!(
        "\n{location}\nZIP: {zip}\n\n\
         {icon}  {temp}°{unit}  {conditions} ({description})\n\n\
         Feels Like  {feels}°{unit}\n\
         Humidity    {humidity}%\n\
         Wind        {wind} mph {direction}\n\n\
         Updated: {updated}\n\
         Data from National Weather Service\n",
        location = weather.location,
        zip = weather.zip_code,
        temp = weather.temperature,
        conditions = weather.conditions,
        description = icon_description(icon),
        feels = weather.feels_like,
        humidity = weather.humidity,
        wind = weather.wind_speed,
        direction = weather.wind_direction,
    )
}

pub fn error_line(err: &ClassifiedError) -> String {
    format!("⚠️  {}", err.message)
}

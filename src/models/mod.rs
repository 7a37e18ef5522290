pub mod weather_table;
